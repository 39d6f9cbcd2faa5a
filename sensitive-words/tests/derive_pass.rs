//! Derive shapes that must compile.

#[test]
fn derive_pass() {
    let cases = trybuild::TestCases::new();
    cases.pass("tests/ui/pass/*.rs");
}
