use crate::listing::resolve_url;
use crate::normalize;
use scraper::{ElementRef, Html, Selector};

/// Fields extracted from a profile page, before they are joined with the
/// listing row into a `ProfileRecord`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProfile {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub photos: Vec<String>,
    pub videos: Vec<String>,
    pub about: Vec<String>,
    pub history: Option<String>,
}

/// Parse an adoption profile page.
///
/// Returns `None` only when the page has no `div.adoptionProfilePage` root;
/// every other field is optional and left empty when its markup is missing.
/// Photo and video links are resolved against `page_url`.
pub fn parse_profile_page(html: &str, page_url: &str) -> Option<ParsedProfile> {
    let document = Html::parse_document(html);
    let root_sel = Selector::parse("div.adoptionProfilePage").expect("valid selector");
    let root = document.select(&root_sel).next()?;

    let name = select_text(root, ".profile-head h3");
    let (age, gender) = select_text(root, ".profile-head .body-secondary")
        .map(|text| split_age_gender(&text))
        .unwrap_or_default();
    let (photos, videos) = slider_media(root, page_url);

    let item_sel = Selector::parse(".profile-skills .items .item span").expect("valid selector");
    let about = root
        .select(&item_sel)
        .filter_map(|span| normalize::non_empty(&span.text().collect::<String>()))
        .collect();

    let history_sel = Selector::parse("div.profile-history p.body-secondary").expect("valid selector");
    let history = root.select(&history_sel).next().and_then(|p| {
        let text = normalize::strip_line_breaks(&p.text().collect::<Vec<_>>().join("\n"));
        (!text.is_empty()).then_some(text)
    });

    Some(ParsedProfile {
        name,
        age,
        gender,
        photos,
        videos,
        about,
        history,
    })
}

/// Split "1 місяць, Хлопчик" into age and gender.
pub fn split_age_gender(text: &str) -> (Option<String>, Option<String>) {
    let mut parts = text.split(',').map(normalize::non_empty);
    let age = parts.next().flatten();
    let gender = parts.next().flatten();
    (age, gender)
}

fn select_text(root: ElementRef<'_>, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).expect("valid selector");
    root.select(&sel)
        .next()
        .and_then(|el| normalize::non_empty(&el.text().collect::<String>()))
}

/// Walk the slider: video slides contribute their `data-link`, every other
/// slide its lazy-loaded image.
fn slider_media(root: ElementRef<'_>, page_url: &str) -> (Vec<String>, Vec<String>) {
    let slide_sel = Selector::parse(".swiper.slider-profile .swiper-slide").expect("valid selector");
    let video_sel = Selector::parse(".videoBlock.img").expect("valid selector");
    let img_sel = Selector::parse(".img img").expect("valid selector");

    let mut photos = Vec::new();
    let mut videos = Vec::new();
    for slide in root.select(&slide_sel) {
        if let Some(video) = slide.select(&video_sel).next() {
            if let Some(link) = video.value().attr("data-link").and_then(|l| resolve_url(page_url, l)) {
                videos.push(link);
            }
        } else if let Some(src) = slide
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("data-src"))
            .and_then(|src| resolve_url(page_url, src))
        {
            photos.push(src);
        }
    }
    (photos, videos)
}
