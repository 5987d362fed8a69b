//! Property tests for the input ring buffer

use super::{Empty, Full, RingBuffer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn reads_return_writes_in_order(bytes in prop::collection::vec(any::<u8>(), 0..=32)) {
        let mut rb: RingBuffer = RingBuffer::new();
        for &b in &bytes {
            prop_assert_eq!(rb.write(b), Ok(()));
        }
        prop_assert_eq!(rb.len(), bytes.len());
        for &b in &bytes {
            prop_assert_eq!(rb.read(), Ok(b));
        }
        prop_assert_eq!(rb.read(), Err(Empty));
    }

    #[test]
    fn count_tracks_interleaved_operations(ops in prop::collection::vec(any::<Option<u8>>(), 0..200)) {
        let mut rb: RingBuffer<8> = RingBuffer::new();
        let mut model = std::collections::VecDeque::new();
        for op in ops {
            match op {
                Some(b) => {
                    let res = rb.write(b);
                    if model.len() == 8 {
                        prop_assert_eq!(res, Err(Full(b)));
                    } else {
                        prop_assert_eq!(res, Ok(()));
                        model.push_back(b);
                    }
                }
                None => {
                    prop_assert_eq!(rb.read().ok(), model.pop_front());
                }
            }
            prop_assert_eq!(rb.len(), model.len());
            prop_assert_eq!(rb.is_full(), model.len() == 8);
            prop_assert_eq!(rb.is_empty(), model.is_empty());
        }
    }
}
