use crate::countdown::{days_left, Clock};
use crate::feed::SaleItem;
use crate::filter::Mode;
use crate::locale::Lang;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub lang: Lang,
    pub mode: Mode,
}

impl RenderOptions {
    pub fn new(lang: Lang, mode: Mode) -> Self {
        Self { lang, mode }
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Formats a yen amount the way ja-JP number formatting does: comma
/// grouping and at most three fraction digits.
pub fn format_yen(amount: f64) -> String {
    let rounded = (amount * 1000.0).round() / 1000.0;
    let formatted = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    // A negative amount that rounds to zero still prints as -0.
    if rounded.is_sign_negative() && !rounded.is_nan() {
        out.push('-');
    }
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Integral values print without a decimal point.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub href: String,
    pub label: &'static str,
}

/// A rendered sale card, fields already localized.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub store: String,
    pub r18: bool,
    pub rating_label: &'static str,
    pub countdown: Option<String>,
    pub title: String,
    pub price: String,
    pub discount: String,
    pub points: String,
    pub lang: Lang,
    pub ends: String,
    pub link: Option<Link>,
}

impl Card {
    pub fn to_html(&self) -> String {
        let lang = self.lang;
        let store = escape_html(&self.store);
        let rating_badge = if self.r18 {
            format!(r#"<span class="badge r18">{}</span>"#, self.rating_label)
        } else {
            format!(r#"<span class="badge">{}</span>"#, self.rating_label)
        };
        let countdown_badge = self
            .countdown
            .as_deref()
            .map(|c| format!(r#"<span class="badge">{}</span>"#, escape_html(c)))
            .unwrap_or_default();
        let title = escape_html(&self.title);
        let (price, discount, points) = (&self.price, &self.discount, &self.points);
        let (off, points_label, ends_label) = (lang.off(), lang.points(), lang.ends());
        let ends = escape_html(&self.ends);
        let link = self
            .link
            .as_ref()
            .map(|link| {
                format!(
                    r#"
  <div style="margin-top:10px">
    <a href="{}" target="_blank" rel="noopener">{}</a>
  </div>"#,
                    escape_html(&link.href),
                    link.label
                )
            })
            .unwrap_or_default();

        format!(
            r#"<div class="card">
  <div class="row">
    <span class="badge">{store}</span>
    {rating_badge}
    {countdown_badge}
  </div>
  <h3 style="margin:10px 0 6px">{title}</h3>
  <div class="kpi row">
    <span class="price">¥{price}</span>
    <span>{off} {discount}%</span>
    <span>{points_label} {points}%</span>
    <span class="muted">{ends_label}: {ends}</span>
  </div>{link}
</div>
"#
        )
    }
}

/// Anything that goes into the list container.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Card(Card),
    Empty(String),
    Error(String),
}

impl Node {
    pub fn to_html(&self) -> String {
        match self {
            Self::Card(card) => card.to_html(),
            Self::Empty(text) => format!("<div class=\"muted\">{}</div>\n", escape_html(text)),
            Self::Error(text) => format!("<div class=\"error\">{}</div>\n", escape_html(text)),
        }
    }
}

/// Renders `item` as a card, or `None` when `opts.mode` filters it out.
pub fn render_item(item: &SaleItem, opts: &RenderOptions, clock: &Clock) -> Option<Card> {
    if !opts.mode.admits(item) {
        return None;
    }
    let lang = opts.lang;
    let r18 = item.is_r18();
    let rating_label = if r18 { lang.r18() } else { lang.all_ages() };

    Some(Card {
        store: item.store().unwrap_or("-").to_string(),
        r18,
        rating_label,
        countdown: days_left(item.sale_ends_at(), lang, clock),
        title: item.title(lang).to_string(),
        price: format_yen(item.price_jpy.unwrap_or(0.0)),
        discount: format_number(item.discount_percent.unwrap_or(0.0)),
        points: format_number(item.points_percent.unwrap_or(0.0)),
        lang,
        ends: item
            .sale_ends_at()
            .map_or_else(|| "-".to_string(), |end| end.to_string()),
        link: item.url().map(|href| Link {
            href: href.to_string(),
            label: lang.open_store(),
        }),
    })
}
