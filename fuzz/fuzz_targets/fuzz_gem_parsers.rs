#![no_main]

use gemxml::parser::{GemParser, ParserConfig, ParserKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The tree parser needs text; the tokenizer-based parsers also get raw bytes
    let Ok(xml) = std::str::from_utf8(data) else {
        let _ = gemxml::parser::PushParser::new(ParserConfig::default()).parse_reader(data);
        let _ = gemxml::parser::PullParser::new(ParserConfig::default()).parse_reader(data);
        return;
    };

    // Every strategy must either succeed or fail with an error, never panic
    for strict in [false, true] {
        for kind in ParserKind::ALL {
            let _ = kind.parser(ParserConfig::default().strict(strict)).parse_str(xml);
        }
    }
});
