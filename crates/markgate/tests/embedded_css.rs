use anyhow::Result;
use markgate::{Checker, GateError, SafeChild};

#[test]
fn accepts_allowed_embedded_rules() -> Result<()> {
    let checker = Checker::default();
    let document = checker.check("<style>div{color:red}</style>")?;

    let SafeChild::Element(style) = &document.children[0] else {
        panic!("expected a style element");
    };
    assert_eq!(style.tag, "style");
    assert_eq!(
        style.children,
        vec![SafeChild::Text("div{color:red}".to_string())],
        "stylesheet text must be preserved unchanged"
    );
    Ok(())
}

#[test]
fn rejects_position_fixed_in_embedded_rules() {
    let err = Checker::default()
        .check("<style>div{position:fixed}</style>")
        .unwrap_err();
    assert_eq!(
        err,
        GateError::ForbiddenValue {
            property: "position".to_string(),
            value: "fixed".to_string(),
        }
    );
}

#[test]
fn rejects_unlisted_property_in_a_later_rule() {
    let err = Checker::default()
        .check("<style>p{color:red} div{cursor:pointer}</style>")
        .unwrap_err();
    assert_eq!(err, GateError::DisallowedCssProperty("cursor".to_string()));
}

#[test]
fn rejects_broken_embedded_css() {
    let err = Checker::default()
        .check("<style>div { color }</style>")
        .unwrap_err();
    assert!(
        matches!(err, GateError::InvalidCss(_)),
        "the CSS validator should reject a valueless declaration, got {err:?}"
    );
}

#[test]
fn rejects_unbalanced_braces() {
    let err = Checker::default()
        .check("<style>div{color:red}}</style>")
        .unwrap_err();
    assert!(
        matches!(
            err,
            GateError::InvalidCss(_) | GateError::UnbalancedBraces { .. }
        ),
        "a stray closing brace must not pass, got {err:?}"
    );
}

#[test]
fn hyphenated_properties_normalize_in_embedded_rules() -> Result<()> {
    Checker::default().check("<style>div{background-color:blue; z-index: 2}</style>")?;
    Ok(())
}

#[test]
fn empty_style_element_is_fine() -> Result<()> {
    Checker::default().check("<style></style>")?;
    Ok(())
}

#[test]
fn style_content_round_trips_through_serialization() -> Result<()> {
    let checker = Checker::default();
    let input = "<style>div{color:red}</style>";
    let serialized = checker.check_to_string(input)?;
    assert_eq!(serialized, input);
    checker.check(&serialized)?;
    Ok(())
}

#[test]
fn page_rule_declarations_are_still_checked() {
    let checker = Checker::default();
    let err = checker
        .check("<style>@page { position: fixed }</style>")
        .unwrap_err();
    assert_eq!(
        err,
        GateError::ForbiddenValue {
            property: "position".to_string(),
            value: "fixed".to_string(),
        }
    );
    let err = checker
        .check("<style>@page { cursor: pointer }</style>")
        .unwrap_err();
    assert_eq!(err, GateError::DisallowedCssProperty("cursor".to_string()));
}

#[test]
fn media_wrapped_declarations_are_still_checked() {
    let err = Checker::default()
        .check("<style>@media screen { div { position: fixed } }</style>")
        .unwrap_err();
    assert_eq!(
        err,
        GateError::ForbiddenValue {
            property: "position".to_string(),
            value: "fixed".to_string(),
        }
    );
}
