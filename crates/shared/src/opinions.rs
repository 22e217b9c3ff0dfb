use crate::models::{OpinionRow, VenueRow};

/// Characters shown on a feed tile before truncation.
pub const PREVIEW_CHARS: usize = 60;

/// Tile text: the first 60 characters, with an ellipsis when cut.
pub fn preview(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Escape text for insertion into HTML or SVG markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for insertion as markup, then turn newlines into `<br>`.
/// Escaping must come first or the inserted tags would be escaped too.
pub fn escape_message(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

fn or_fallback(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Accessible label of a feed tile.
pub fn tile_title(opinion: &OpinionRow) -> String {
    format!(
        "Mensaje de {} desde {}",
        or_fallback(&opinion.name, "Anónimo"),
        or_fallback(&opinion.country, "desconocido")
    )
}

/// Everything the detail overlay shows. `message_html` is already escaped.
#[derive(Debug, Clone, PartialEq)]
pub struct OpinionDetail {
    pub heading: String,
    pub country: String,
    pub concert: String,
    pub message_html: String,
    pub social_links: String,
}

impl From<&OpinionRow> for OpinionDetail {
    fn from(opinion: &OpinionRow) -> Self {
        OpinionDetail {
            heading: format!("Mensaje de {}", or_fallback(&opinion.name, "Anónimo")),
            country: or_fallback(&opinion.country, "Desconocido"),
            concert: or_fallback(&opinion.concert_label, "No indicado"),
            message_html: escape_message(&opinion.message),
            social_links: or_fallback(&opinion.social_links, "No proporcionadas"),
        }
    }
}

/// Keys that open a focused tile.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

/// Keys that close an open overlay.
pub fn is_close_key(key: &str) -> bool {
    matches!(key, "Escape" | "Esc")
}

/// Re-filter the loaded opinions by country. No country shows everything.
pub fn filter_by_country<'a>(all: &'a [OpinionRow], country: Option<&str>) -> Vec<&'a OpinionRow> {
    match country.map(str::trim).filter(|c| !c.is_empty()) {
        None => all.iter().collect(),
        Some(country) => {
            let wanted = country.to_lowercase();
            all.iter()
                .filter(|o| o.country.trim().to_lowercase() == wanted)
                .collect()
        }
    }
}

/// Sorted unique countries present in the feed.
pub fn countries(all: &[OpinionRow]) -> Vec<String> {
    let mut out: Vec<String> = all
        .iter()
        .map(|o| o.country.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    out.sort();
    out.dedup();
    out
}

/// Concert checkboxes for the opinion form, labelled by venue name or,
/// failing that, city. A venue with several event rows appears once, at its
/// first row.
pub fn concert_choices(venues: &[VenueRow]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for v in venues {
        let label = if v.venue_name.trim().is_empty() {
            v.city.trim()
        } else {
            v.venue_name.trim()
        };
        if label.is_empty() || labels.iter().any(|l| l == label) {
            continue;
        }
        labels.push(label.to_string());
    }
    labels
}
