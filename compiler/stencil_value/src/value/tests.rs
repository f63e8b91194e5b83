use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_truthiness_of_ordinary_values() {
    assert_eq!(Value::Undefined.to_bool().ok(), Some(false));
    assert_eq!(Value::Bool(true).to_bool().ok(), Some(true));
    assert_eq!(Value::Int(0).to_bool().ok(), Some(false));
    assert_eq!(Value::Int(-3).to_bool().ok(), Some(true));
    assert_eq!(Value::Float(0.0).to_bool().ok(), Some(false));
    assert_eq!(Value::string("").to_bool().ok(), Some(false));
    assert_eq!(Value::string("a").to_bool().ok(), Some(true));
    assert_eq!(Value::vector(vec![]).to_bool().ok(), Some(false));
    assert_eq!(Value::vector(vec![Value::Int(1)]).to_bool().ok(), Some(true));
}

#[test]
fn test_signals_have_no_truthiness() {
    for signal in [
        Value::break_signal(),
        Value::continue_signal(),
        Value::return_with(Value::Int(1)),
    ] {
        let Err(err) = signal.to_bool() else {
            panic!("expected truthiness of {signal} to fail");
        };
        assert!(matches!(err.kind, crate::EvalErrorKind::TypeMismatch { .. }));
    }
}

#[test]
fn test_signals_have_no_text() {
    assert!(Value::break_signal().to_text().is_err());
    assert!(Value::return_with(Value::string("x")).to_text().is_err());
}

#[test]
fn test_text_forms() {
    assert_eq!(Value::Undefined.to_text().ok(), Some(String::new()));
    assert_eq!(Value::string("hi").to_text().ok(), Some("hi".to_string()));
    assert_eq!(Value::Int(42).to_text().ok(), Some("42".to_string()));
    assert_eq!(Value::Bool(false).to_text().ok(), Some("false".to_string()));
    assert_eq!(
        Value::vector(vec![Value::Int(1), Value::string("b")])
            .to_text()
            .ok(),
        Some("[1, b]".to_string())
    );
}

#[test]
fn test_signal_kind_and_keyword() {
    let ret = Value::return_with(Value::Undefined);
    let kind = ret.signal().map(Signal::kind);
    assert_eq!(kind, Some(SignalKind::Return));
    assert_eq!(SignalKind::Break.keyword(), "#break");
    assert_eq!(Value::Int(1).signal(), None);
}

#[test]
fn test_equality_is_numeric_across_int_and_float() {
    assert_eq!(Value::Int(2).equals(&Value::Float(2.0)).ok(), Some(true));
    assert_eq!(Value::Float(2.5).equals(&Value::Int(2)).ok(), Some(false));
    assert_eq!(
        Value::string("a").equals(&Value::Int(1)).ok(),
        Some(false)
    );
}

#[test]
fn test_equality_of_vectors() {
    let a = Value::vector(vec![Value::Int(1), Value::Float(2.0)]);
    let b = Value::vector(vec![Value::Float(1.0), Value::Int(2)]);
    let c = Value::vector(vec![Value::Int(1)]);
    assert_eq!(a.equals(&b).ok(), Some(true));
    assert_eq!(a.equals(&c).ok(), Some(false));
}

#[test]
fn test_equality_rejects_signals() {
    assert!(Value::break_signal().equals(&Value::Int(1)).is_err());
    assert!(Value::Int(1).equals(&Value::continue_signal()).is_err());
}

#[test]
fn test_conversions() {
    assert_eq!(Value::from("x"), Value::string("x"));
    assert_eq!(Value::from(3_i64), Value::Int(3));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::default(), Value::Undefined);
}
