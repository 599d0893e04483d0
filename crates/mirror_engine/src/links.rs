use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Hyperlink targets of a listing page, in document order.
///
/// The literal parent-directory anchors (`../`, `/`) that index pages emit
/// are excluded; everything else is returned raw for the caller to resolve.
/// A non-listing page simply yields zero or irrelevant links, which is safe
/// because extension filtering and trailing-separator detection downstream
/// self-correct against false positives.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut hrefs = Vec::new();
    for child in document.root_element().children() {
        visit_node(child, &mut hrefs);
    }
    hrefs
}

fn visit_node(node: NodeRef<'_, Node>, hrefs: &mut Vec<String>) {
    if let Node::Element(_) = node.value() {
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name().eq_ignore_ascii_case("a") {
                collect_anchor(element, hrefs);
            }
        }
    }
    for child in node.children() {
        visit_node(child, hrefs);
    }
}

fn collect_anchor(element: ElementRef, hrefs: &mut Vec<String>) {
    if let Some(href) = element.value().attr("href").map(str::trim) {
        if !href.is_empty() && !is_parent_marker(href) {
            hrefs.push(href.to_string());
        }
    }
}

fn is_parent_marker(href: &str) -> bool {
    matches!(href, "../" | "/")
}
