// Queue naming convention

/// Suffix appended to every convention-derived queue name
pub const QUEUE_SUFFIX: &str = "_QUEUE";

/// Path separator used in qualified type identifiers
const PATH_SEPARATOR: &str = "::";

/// Strip any module path (`shop::pizza::PizzaWorkflow` -> `PizzaWorkflow`)
pub fn simple_name(type_name: &str) -> &str {
    type_name
        .rsplit_once(PATH_SEPARATOR)
        .map_or(type_name, |(_, last)| last)
}

/// Derive the canonical queue name for a type identifier
///
/// A `_` is inserted wherever an ASCII lowercase letter is followed by an
/// uppercase one, the result is uppercased and `_QUEUE` is appended.
///
/// Leading acronyms are kept as one word with whatever follows them:
/// `HTTPClientWorkflow` becomes `HTTPCLIENT_WORKFLOW_QUEUE`.
///
/// # Example
/// ```
/// use steward_core::domain::naming::derive_queue_name;
///
/// assert_eq!(derive_queue_name("OrderWorkflow"), "ORDER_WORKFLOW_QUEUE");
/// ```
pub fn derive_queue_name(type_name: &str) -> String {
    let name = simple_name(type_name);
    let mut out = String::with_capacity(name.len() + QUEUE_SUFFIX.len() + 4);
    let mut prev_lower = false;

    for ch in name.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            out.push('_');
        }
        prev_lower = ch.is_ascii_lowercase();
        out.extend(ch.to_uppercase());
    }

    out.push_str(QUEUE_SUFFIX);
    out
}
