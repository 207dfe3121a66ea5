use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! pattern {
    ($fn_name:ident, $static_name:ident, $doc:expr, $pattern:expr) => {
        static $static_name: Lazy<Regex> =
            Lazy::new(|| Regex::new($pattern).expect("invalid regex"));

        #[doc = $doc]
        pub fn $fn_name(value: &str) -> bool {
            $static_name.is_match(value)
        }
    };
}

pattern!(
    is_event_type,
    EVENT_TYPE,
    "Dotted lowercase event type with at least two segments, like `order.created`.",
    r"^[a-z][a-z0-9-]*(\.[a-z][a-z0-9-]*)+$"
);
pattern!(
    is_source,
    SOURCE,
    "Dotted lowercase producer name, like `svc.orders` or `billing`.",
    r"^[a-z][a-z0-9-]*(\.[a-z][a-z0-9-]*)*$"
);
pattern!(
    is_traceparent,
    TRACEPARENT,
    "W3C trace-context `traceparent`: `version-traceid-parentid-flags` in lowercase hex.",
    r"^[0-9a-f]{2}-[0-9a-f]{32}-[0-9a-f]{16}-[0-9a-f]{2}$"
);
