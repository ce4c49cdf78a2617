use crate::client::Fetcher;
use crate::normalize;
use adoption_model::{Category, ListingRow};
use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// One parsed listing page.
#[derive(Debug, Default)]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    /// Cards dropped because a required field was missing.
    pub skipped: usize,
    pub next_url: Option<String>,
}

/// Scrape every listing page reachable from `start_url` by following the
/// "next" link.
///
/// An unreachable first page is an error. A failure further along stops
/// pagination and keeps what was collected. Cards are deduplicated by link.
/// When `category` is `None` it is inferred from the start URL.
pub async fn scrape_listings(
    fetcher: &Fetcher,
    start_url: &str,
    category: Option<Category>,
) -> Result<Vec<ListingRow>> {
    let category = category.or_else(|| Category::from_listing_url(start_url));
    if category.is_none() {
        tracing::warn!(url = %start_url, "Could not infer animal category from URL");
    }

    let mut rows = Vec::new();
    let mut seen_links = HashSet::new();
    let mut visited = HashSet::new();
    let mut skipped = 0;
    let mut current = Some(start_url.to_string());

    while let Some(url) = current.take() {
        if !visited.insert(url.clone()) {
            tracing::warn!(url = %url, "Pagination loops back to a visited page; stopping");
            break;
        }

        let html = match fetcher.fetch_text(&url).await {
            Ok(html) => html,
            Err(err) if visited.len() == 1 => {
                return Err(err).with_context(|| format!("Failed to fetch listing page {url}"));
            }
            Err(err) => {
                tracing::error!(url = %url, error = %err, "Error fetching listing page; stopping");
                break;
            }
        };

        let page = parse_listing_page(&html, &url);
        skipped += page.skipped;
        let mut added = 0;
        for mut row in page.rows {
            if seen_links.insert(row.link.clone()) {
                row.category = category;
                rows.push(row);
                added += 1;
            }
        }

        tracing::info!(
            url = %url,
            added,
            next = page.next_url.as_deref().unwrap_or("(no more pages)"),
            "Processed listing page"
        );
        current = page.next_url;
    }

    tracing::info!(
        pages = visited.len(),
        animals = rows.len(),
        skipped,
        "Listing scrape finished"
    );
    Ok(rows)
}

/// Parse the animal cards and the pagination link from one listing page.
///
/// Relative links and image sources are resolved against `page_url`.
pub fn parse_listing_page(html: &str, page_url: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let card_sel = Selector::parse("div.animalCard").expect("valid selector");
    let next_sel = Selector::parse("a.next:not(.disabled)").expect("valid selector");
    let card_fields = CardSelectors::new();

    let mut page = ListingPage::default();
    for card in document.select(&card_sel) {
        match parse_card(card, &card_fields, page_url) {
            Ok(row) => page.rows.push(row),
            Err(missing) => {
                tracing::warn!(missing, "Skipping animal card with missing data");
                page.skipped += 1;
            }
        }
    }

    page.next_url = document
        .select(&next_sel)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href));

    page
}

struct CardSelectors {
    button: Selector,
    link: Selector,
    name: Selector,
    info: Selector,
    img: Selector,
    popup_id: Regex,
}

impl CardSelectors {
    fn new() -> Self {
        Self {
            button: Selector::parse(r#"button[onclick*="setPopupData"]"#).expect("valid selector"),
            link: Selector::parse("a.animalCard__link").expect("valid selector"),
            name: Selector::parse("h5").expect("valid selector"),
            info: Selector::parse("p").expect("valid selector"),
            img: Selector::parse("img.animalCard__photo").expect("valid selector"),
            popup_id: Regex::new(r"setPopupData\((\d+)").expect("valid regex"),
        }
    }
}

/// Extract one card. On failure, returns the name of the first missing field.
fn parse_card(
    card: ElementRef<'_>,
    sel: &CardSelectors,
    page_url: &str,
) -> Result<ListingRow, &'static str> {
    let pet_id = card
        .select(&sel.button)
        .next()
        .and_then(|b| b.value().attr("onclick"))
        .and_then(|onclick| sel.popup_id.captures(onclick))
        .map(|caps| caps[1].to_string())
        .ok_or("pet_id")?;

    let link = card
        .select(&sel.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_url(page_url, href))
        .ok_or("link")?;

    let name = card
        .select(&sel.name)
        .next()
        .and_then(|h| normalize::non_empty(&h.text().collect::<String>()))
        .ok_or("name")?;

    let info = card
        .select(&sel.info)
        .next()
        .map(|p| normalize::clean_text(&p.text().collect::<String>()))
        .unwrap_or_default();
    let mut parts = info.split(',').map(str::trim);
    let sex = parts.next().filter(|s| !s.is_empty()).ok_or("sex")?.to_string();
    let age = parts.next().filter(|s| !s.is_empty()).ok_or("age")?.to_string();

    let photo_url = card
        .select(&sel.img)
        .next()
        .and_then(|img| img.value().attr("data-src"))
        .and_then(|src| resolve_url(page_url, src))
        .ok_or("photo_url")?;

    Ok(ListingRow {
        pet_id,
        link,
        name: Some(name),
        category: None,
        sex: Some(sex),
        age: Some(age),
        photo_url: Some(photo_url),
    })
}

/// Resolve `href` against `base`. Absolute hrefs pass through unchanged.
pub(crate) fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(base) {
        Ok(base) => base.join(href).ok().map(String::from),
        Err(_) => Url::parse(href).ok().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
    <html><body>
    <div class="animalCard">
        <a class="animalCard__link" href="/pet/piksel">
            <img class="animalCard__photo" data-src="/uploads/piksel.jpg">
        </a>
        <h5> Піксель </h5>
        <p>Хлопчик, 1 місяць</p>
        <button onclick="setPopupData(1728, 'Піксель')">Adopt</button>
    </div>
    <div class="animalCard">
        <a class="animalCard__link" href="https://dogcat.com.ua/pet/cimba">
            <img class="animalCard__photo" data-src="https://cdn.example/cimba.jpg">
        </a>
        <h5>Цімба</h5>
        <p>Дівчинка, 2 роки</p>
        <button onclick="setPopupData(1727)">Adopt</button>
    </div>
    <div class="animalCard">
        <a class="animalCard__link" href="/pet/noid"></a>
        <h5>No Id</h5>
        <p>Хлопчик, 3 роки</p>
    </div>
    <a class="prev disabled" href="#">Prev</a>
    <a class="next" href="?animal=2&amp;page=2">Next</a>
    </body></html>
    "##;

    #[test]
    fn test_parse_listing_page() {
        let page = parse_listing_page(PAGE, "https://dogcat.com.ua/adoption?animal=2");

        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.skipped, 1);

        let first = &page.rows[0];
        assert_eq!(first.pet_id, "1728");
        assert_eq!(first.link, "https://dogcat.com.ua/pet/piksel");
        assert_eq!(first.name.as_deref(), Some("Піксель"));
        assert_eq!(first.sex.as_deref(), Some("Хлопчик"));
        assert_eq!(first.age.as_deref(), Some("1 місяць"));
        assert_eq!(
            first.photo_url.as_deref(),
            Some("https://dogcat.com.ua/uploads/piksel.jpg")
        );

        assert_eq!(page.rows[1].pet_id, "1727");
        assert_eq!(page.rows[1].photo_url.as_deref(), Some("https://cdn.example/cimba.jpg"));

        assert_eq!(
            page.next_url.as_deref(),
            Some("https://dogcat.com.ua/adoption?animal=2&page=2")
        );
    }

    #[test]
    fn test_disabled_next_ends_pagination() {
        let html = r#"<div class="animalCard"></div><a class="next disabled" href="?page=9">Next</a>"#;
        let page = parse_listing_page(html, "https://dogcat.com.ua/adoption?animal=1");
        assert!(page.next_url.is_none());
        assert!(page.rows.is_empty());
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_card_without_age_is_skipped() {
        let html = r#"
        <div class="animalCard">
            <a class="animalCard__link" href="/pet/a"></a>
            <img class="animalCard__photo" data-src="/a.jpg">
            <h5>A</h5><p>Хлопчик</p>
            <button onclick="setPopupData(5)"></button>
        </div>"#;
        let page = parse_listing_page(html, "https://dogcat.com.ua/adoption");
        assert!(page.rows.is_empty());
        assert_eq!(page.skipped, 1);
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://dogcat.com.ua/adoption?animal=2", "/pet/x").as_deref(),
            Some("https://dogcat.com.ua/pet/x")
        );
        assert_eq!(
            resolve_url("not a url", "https://dogcat.com.ua/pet/x").as_deref(),
            Some("https://dogcat.com.ua/pet/x")
        );
        assert_eq!(resolve_url("not a url", "/pet/x"), None);
        assert_eq!(resolve_url("https://dogcat.com.ua/", "  "), None);
    }
}
