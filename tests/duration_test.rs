mod common;

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use timetype::{
    DbValue, Duration, ErrorCategory, ParseDurationError, Scan, TimeTypeError, ToDbValue,
};

fn hms(h: i64, m: i64, s: i64) -> Duration {
    Duration::HOUR * h + Duration::MINUTE * m + Duration::SECOND * s
}

#[test]
fn test_duration_from_json() {
    common::init_test_logger();

    let d = Duration::from_json(b"\"1h5m3s\"").unwrap();
    assert_eq!(d, hms(1, 5, 3));

    let d = Duration::from_json(b"3903000000000").unwrap();
    assert_eq!(d, hms(1, 5, 3));
    assert_eq!(d.as_nanos(), 3_903_000_000_000);

    // errors
    let err = Duration::from_json(b"true").unwrap_err();
    assert_eq!(err.to_string(), "timetype: invalid duration");
    assert!(matches!(err, TimeTypeError::InvalidDuration));

    // duration should be quoted or passed as a number
    let err = Duration::from_json(b"1h5m3s").unwrap_err();
    assert!(matches!(&err, TimeTypeError::Json(e) if e.is_syntax()));

    let err = Duration::from_json(b"\"123\"").unwrap_err();
    assert_eq!(err.to_string(), "missing unit in duration \"123\"");
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert!(matches!(
        err,
        TimeTypeError::DurationParse(ParseDurationError::MissingUnit(_))
    ));
}

#[test]
fn test_duration_from_json_numbers() {
    assert_eq!(Duration::from_json(b"0").unwrap(), Duration::ZERO);
    assert_eq!(Duration::from_json(b"-1500").unwrap(), Duration::from_nanos(-1500));
    assert_eq!(Duration::from_json(b"1e3").unwrap(), Duration::MICROSECOND);

    // fractional nanoseconds are truncated
    assert_eq!(Duration::from_json(b"1.9").unwrap(), Duration::NANOSECOND);
    assert_eq!(Duration::from_json(b"-1.9").unwrap(), -Duration::NANOSECOND);

    // integers above 2^53 keep full precision
    let d = Duration::from_json(b"9007199254740993").unwrap();
    assert_eq!(d.as_nanos(), 9_007_199_254_740_993);
}

#[test]
fn test_duration_from_json_rejects_other_json_types() {
    for input in ["null", "false", "[1]", "{\"ns\":1}"] {
        let err = Duration::from_json(input.as_bytes()).unwrap_err();
        assert!(
            matches!(err, TimeTypeError::InvalidDuration),
            "input {input}: {err}"
        );
    }
}

#[test]
fn test_duration_scan() {
    common::init_test_logger();

    struct Case {
        arg: DbValue,
        expected: Duration,
        err: Option<&'static str>,
    }

    let tbl = vec![
        Case {
            arg: DbValue::Null,
            expected: Duration::ZERO,
            err: None,
        },
        Case {
            arg: DbValue::Interval(TimeDelta::minutes(5)),
            expected: Duration::MINUTE * 5,
            err: None,
        },
        Case {
            arg: DbValue::Float(10_000_001_000.0),
            expected: Duration::SECOND * 10 + Duration::MICROSECOND,
            err: None,
        },
        Case {
            arg: DbValue::Interval(TimeDelta::hours(32)),
            expected: Duration::HOUR * 32,
            err: None,
        },
        Case {
            arg: DbValue::Int(1500),
            expected: Duration::from_nanos(1500),
            err: None,
        },
        Case {
            arg: DbValue::from(r#""5h3m2s""#),
            expected: hms(5, 3, 2),
            err: None,
        },
        Case {
            arg: DbValue::from(br#""2h3m""#.to_vec()),
            expected: hms(2, 3, 0),
            err: None,
        },
        Case {
            arg: DbValue::Bool(true),
            expected: Duration::ZERO,
            err: Some("timetype: invalid duration"),
        },
        Case {
            arg: DbValue::Time(NaiveTime::from_hms_opt(1, 0, 0).unwrap()),
            expected: Duration::ZERO,
            err: Some("timetype: invalid duration"),
        },
        Case {
            arg: DbValue::Interval(TimeDelta::days(200_000)),
            expected: Duration::ZERO,
            err: Some("timetype: invalid duration"),
        },
    ];

    for (i, tt) in tbl.into_iter().enumerate() {
        let mut d = Duration::default();
        let result = d.scan(tt.arg);
        match tt.err {
            Some(msg) => assert_eq!(result.unwrap_err().to_string(), msg, "case #{i}"),
            None => assert!(result.is_ok(), "case #{i}: {result:?}"),
        }
        assert_eq!(d, tt.expected, "case #{i}");
    }
}

#[test]
fn test_duration_scan_text_is_json() {
    let mut d = Duration::SECOND;
    let err = d.scan(DbValue::from("5h3m2s")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Syntax);

    d.scan(DbValue::from("90000000000")).unwrap();
    assert_eq!(d, Duration::MINUTE + Duration::SECOND * 30);
}

#[test]
fn test_duration_to_db_value() {
    let tbl = [
        (hms(2, 3, 0), br#""2h3m0s""#.to_vec()),
        (hms(5, 3, 2), br#""5h3m2s""#.to_vec()),
        (Duration::SECOND, br#""1s""#.to_vec()),
        (Duration::MILLISECOND, br#""1ms""#.to_vec()),
        (Duration::NANOSECOND, br#""1ns""#.to_vec()),
        (Duration::ZERO, br#""0s""#.to_vec()),
    ];

    for (i, (arg, expected)) in tbl.into_iter().enumerate() {
        let actual = arg.to_db_value().unwrap();
        assert_eq!(actual, DbValue::Bytes(expected), "case #{i}");
    }
}

#[test]
fn test_duration_to_json() {
    let bytes = hms(1, 5, 3).to_json().unwrap();
    assert_eq!(bytes, br#""1h5m3s""#.to_vec());

    let bytes = Duration::MICROSECOND.to_json().unwrap();
    assert_eq!(bytes, "\"1\u{b5}s\"".as_bytes().to_vec());
}

#[test]
fn test_duration_json_round_trip() {
    let samples = [
        Duration::ZERO,
        Duration::NANOSECOND,
        Duration::from_nanos(1_234_567),
        Duration::MILLISECOND * 1500,
        -hms(0, 0, 45),
        hms(26, 0, 1) + Duration::from_nanos(7),
        Duration::from_nanos(i64::MAX),
        Duration::from_nanos(i64::MIN),
    ];

    for d in samples {
        let decoded = Duration::from_json(&d.to_json().unwrap()).unwrap();
        assert_eq!(decoded, d, "{d}");
    }
}

#[test]
fn test_duration_from_str() {
    assert_eq!("1h5m3s".parse::<Duration>(), Ok(hms(1, 5, 3)));
    assert_eq!("-1.5s".parse::<Duration>(), Ok(-Duration::MILLISECOND * 1500));
    assert_eq!(
        "5 minutes".parse::<Duration>(),
        Err(ParseDurationError::UnknownUnit {
            unit: " minutes".to_string(),
            value: "5 minutes".to_string(),
        })
    );
}

#[test]
fn test_duration_interop() {
    assert_eq!(
        hms(0, 1, 30).to_std(),
        Some(std::time::Duration::from_secs(90))
    );
    assert_eq!((-Duration::SECOND).to_std(), None);

    let d = Duration::try_from(std::time::Duration::from_millis(250)).unwrap();
    assert_eq!(d, Duration::MILLISECOND * 250);
    assert!(Duration::try_from(std::time::Duration::from_secs(u64::MAX)).is_err());

    let delta: TimeDelta = hms(1, 0, 0).into();
    assert_eq!(delta, TimeDelta::hours(1));
    assert_eq!(Duration::try_from(delta).unwrap(), Duration::HOUR);
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct RetryPolicy {
    backoff: Duration,
    timeout: Duration,
}

#[test]
fn test_duration_serde_field() {
    let policy = RetryPolicy {
        backoff: Duration::MILLISECOND * 250,
        timeout: Duration::MINUTE + Duration::SECOND * 30,
    };
    let json = serde_json::to_string(&policy).unwrap();
    assert_eq!(json, r#"{"backoff":"250ms","timeout":"1m30s"}"#);
    assert_eq!(serde_json::from_str::<RetryPolicy>(&json).unwrap(), policy);

    let policy: RetryPolicy =
        serde_json::from_str(r#"{"backoff":250000000,"timeout":"1m30s"}"#).unwrap();
    assert_eq!(policy.backoff, Duration::MILLISECOND * 250);

    let err = serde_json::from_str::<RetryPolicy>(r#"{"backoff":true,"timeout":"1s"}"#)
        .unwrap_err();
    assert!(err.to_string().contains("invalid type"), "{err}");
}
