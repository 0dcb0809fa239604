//! Coded-integer codec matrix and properties.

use ebml::vint::{self, WidthClass, MAX_VALUE};
use proptest::prelude::*;

#[test]
fn end_to_end_scenarios() {
    assert_eq!(vint::encode(100), (WidthClass::A, vec![0xE4]));
    assert_eq!(vint::decode(&[0xE4]), (WidthClass::A, 100));
    assert_eq!(vint::decode(&[0x41, 0x00]), (WidthClass::B, 0x0100));
    assert_eq!(vint::decode(&[0x00]), (WidthClass::None, 0));
}

#[test]
fn class_transition_points() {
    for width in 1..8 {
        let class = WidthClass::from_width(width);
        let next = WidthClass::from_width(width + 1);
        let last = class.max_value();

        let (c, bytes) = vint::encode(last);
        assert_eq!(c, class);
        assert_eq!(bytes.len(), width);
        assert_eq!(vint::decode(&bytes), (class, last));

        let (c, bytes) = vint::encode(last + 1);
        assert_eq!(c, next);
        assert_eq!(bytes.len(), width + 1);
        assert_eq!(vint::decode(&bytes), (next, last + 1));
    }
}

#[test]
fn widest_value() {
    let (class, bytes) = vint::encode(MAX_VALUE);
    assert_eq!(class, WidthClass::H);
    assert_eq!(bytes[0], 0x01);
    assert_eq!(vint::decode(&bytes), (WidthClass::H, MAX_VALUE));
}

#[test]
fn class_for_matches_encoded_length() {
    for n in [0, 1, 127, 128, 16_383, 16_384, 1 << 20, 1 << 40, MAX_VALUE] {
        assert_eq!(vint::class_for(n).width(), vint::encode(n).1.len());
    }
}

proptest! {
    #[test]
    fn decode_inverts_encode(n in 0..=MAX_VALUE) {
        let (class, bytes) = vint::encode(n);
        prop_assert_eq!(vint::decode(&bytes), (class, n));
    }

    #[test]
    fn encoding_is_minimal(n in 0..=MAX_VALUE) {
        let (class, bytes) = vint::encode(n);
        prop_assert_eq!(bytes.len(), class.width());
        if class != WidthClass::A {
            let narrower = WidthClass::from_width(class.width() - 1);
            prop_assert!(n > narrower.max_value());
        }
    }

    #[test]
    fn try_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..10)) {
        if let Ok((class, value)) = vint::try_decode(&bytes) {
            prop_assert!(value <= class.max_value());
        }
    }
}
