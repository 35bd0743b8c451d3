#![no_main]

use libfuzzer_sys::fuzz_target;

use ringtape::lexer::find_loop_end;
use ringtape::{ExecutionError, Token};

fn check_loop_end(data: &[u8], open: usize) -> Option<usize> {
    let mut acc = 0;
    for (pos, v) in data.iter().enumerate().skip(open) {
        match v {
            b'[' => acc += 1,
            b']' => acc -= 1,
            _ => continue,
        }
        if acc == 0 {
            return Some(pos);
        }
    }
    None
}

fuzz_target!(|data: &[u8]| {
    for b in data {
        let expected = b"<>+-.,[] \t\n\r\x0b\x0c".contains(b);
        assert_eq!(Token::decode(*b).is_some(), expected);
    }
    for open in data
        .iter()
        .enumerate()
        .filter_map(|(pos, b)| (*b == b'[').then_some(pos))
    {
        match find_loop_end(data, open) {
            Ok(end) => assert_eq!(check_loop_end(data, open), Some(end)),
            Err(ExecutionError::UnmatchedLoopStart { position }) => {
                assert_eq!(position, open);
                assert_eq!(check_loop_end(data, open), None);
            }
            Err(err) => panic!("Unexpected error {err:?}"),
        }
    }
});
