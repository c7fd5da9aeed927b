use cohort_kernel::{OPAQUE_ID_LEN, SAFE_ALPHABET, opaque_id};

#[test]
fn generates_expected_length_and_charset() {
    let id = opaque_id!();
    assert_eq!(id.len(), OPAQUE_ID_LEN);

    for ch in id.chars() {
        assert!(SAFE_ALPHABET.contains(&ch), "unexpected character in id: {ch}");
    }
}

#[test]
fn custom_length() {
    let id = opaque_id!(24);
    assert_eq!(id.len(), 24);
}

#[test]
fn consecutive_ids_differ() {
    assert_ne!(opaque_id!(), opaque_id!());
}

#[test]
fn length_may_be_a_computed_expression() {
    let id = opaque_id!(OPAQUE_ID_LEN * 2);
    assert_eq!(id.len(), OPAQUE_ID_LEN * 2);
}
