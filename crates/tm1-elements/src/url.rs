//! OData URL formatting.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters left untouched when embedding a value in a URL.
const ODATA_LITERAL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Escapes a value for use inside a single-quoted OData string literal and
/// percent-encodes the result.
///
/// ```
/// use tm1_elements::encode_literal;
///
/// assert_eq!(encode_literal("O'Brien"), "O%27%27Brien");
/// assert_eq!(encode_literal("North America"), "North%20America");
/// ```
pub fn encode_literal(value: &str) -> String {
    utf8_percent_encode(&value.replace('\'', "''"), ODATA_LITERAL).to_string()
}

/// Substitutes each `{}` placeholder in `template` with the next argument,
/// encoded with [`encode_literal`].
///
/// Placeholders without a matching argument are kept verbatim; surplus
/// arguments are ignored.
///
/// ```
/// use tm1_elements::format_url;
///
/// let url = format_url(
///     "/api/v1/Dimensions('{}')/Hierarchies('{}')/Elements('{}')",
///     &["Region", "Region", "North America"],
/// );
/// assert_eq!(
///     url,
///     "/api/v1/Dimensions('Region')/Hierarchies('Region')/Elements('North%20America')"
/// );
/// ```
pub fn format_url(template: &str, args: &[&str]) -> String {
    let mut url = String::with_capacity(template.len() + 16 * args.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        url.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => url.push_str(&encode_literal(arg)),
            None => url.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    url.push_str(rest);
    url
}
