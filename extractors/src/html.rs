use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce an HTML email body to plain text so the amount patterns can run
/// over it: drop script/style blocks, strip tags, decode the handful of
/// entities transactional mails actually use, collapse whitespace.
pub fn strip_to_text(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAGS.replace_all(&without_blocks, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // Rupee sign, both decimal and hex forms
        .replace("&#8377;", "₹")
        .replace("&#x20B9;", "₹")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_collapses_whitespace() {
        let html = "<html><body><p>Order   Total:</p>\n<b>₹ 450.00</b></body></html>";
        assert_eq!(strip_to_text(html), "Order Total: ₹ 450.00");
    }

    #[test]
    fn test_drops_style_blocks_entirely() {
        let html = "<style>.total { color: red; }</style><div>Amount Payable: ₹250</div>";
        assert_eq!(strip_to_text(html), "Amount Payable: ₹250");
    }

    #[test]
    fn test_decodes_rupee_entity() {
        let html = "<td>Total</td><td>&#8377;1,299.00</td>";
        assert_eq!(strip_to_text(html), "Total ₹1,299.00");
    }
}
