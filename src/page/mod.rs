//! HTML rendering for the landing page.
//!
//! The renderer reflects exactly one of three states into the projects
//! region: empty placeholder, error placeholder, or one card per
//! repository in loader order (the renderer never re-sorts). It also
//! renders the page shell served at `/`, whose tagline/main/footer regions
//! stay `hidden` until the reveal transition.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{RenderState, Repository};

const EMPTY_PLACEHOLDER: &str = "Nothing to show here yet.";
const ERROR_PLACEHOLDER: &str = "Could not load projects right now.";
const NO_DESCRIPTION: &str = "No description provided.";

/// A rendered projects region: the derived render state plus the HTML
/// fragment the front-end swaps in.
#[derive(Debug, Clone)]
pub struct ProjectsFragment {
    pub state: RenderState,
    pub html: String,
}

/// Render the projects region from a ranked repository list.
///
/// An empty list shows the empty placeholder and no cards; a non-empty
/// list hides both placeholders and appends one card per repository.
pub fn render_projects(repos: &[Repository], now: DateTime<Utc>) -> ProjectsFragment {
    if repos.is_empty() {
        return ProjectsFragment {
            state: RenderState::Empty,
            html: region_html("", true, false),
        };
    }

    let cards: String = repos.iter().map(|repo| repo_card(repo, now)).collect();
    ProjectsFragment {
        state: RenderState::Populated,
        html: region_html(&cards, false, false),
    }
}

/// Render the error state. Independent entry point: bypasses list
/// processing entirely, shows the error placeholder, hides the empty one.
pub fn render_error() -> ProjectsFragment {
    ProjectsFragment {
        state: RenderState::Error,
        html: region_html("", false, true),
    }
}

fn region_html(cards: &str, show_empty: bool, show_error: bool) -> String {
    format!(
        "<section id=\"projects\" class=\"project-grid\" aria-live=\"polite\">{cards}</section>\n\
         <p id=\"projects-empty\" class=\"placeholder\"{}>{EMPTY_PLACEHOLDER}</p>\n\
         <p id=\"projects-error\" class=\"placeholder\"{}>{ERROR_PLACEHOLDER}</p>",
        hidden_attr(!show_empty),
        hidden_attr(!show_error),
    )
}

fn repo_card(repo: &Repository, now: DateTime<Utc>) -> String {
    let name = escape_html(&repo.name);
    let url = escape_html(&repo.html_url);
    let description = escape_html(repo.description.as_deref().unwrap_or(NO_DESCRIPTION));

    let mut meta = String::new();
    meta.push_str(&meta_item(&format!("⭐ {}", repo.stargazers_count)));
    meta.push_str(&meta_item(&format!("🍴 {}", repo.forks_count)));
    meta.push_str(&meta_item(&format!(
        "🕒 {}",
        format_relative_time(repo.updated_at, now)
    )));
    if let Some(language) = &repo.language {
        meta.push_str(&meta_item(&format!("💡 {}", escape_html(language))));
    }

    let mut actions = format!(
        "<a href=\"{url}\" target=\"_blank\" rel=\"noopener\">View repository</a>"
    );
    if let Some(homepage) = repo.homepage() {
        actions.push_str(&format!(
            "<a class=\"secondary\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Live demo</a>",
            escape_html(homepage)
        ));
    }

    format!(
        "<article class=\"project-card\">\
         <h3><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{name}</a></h3>\
         <p class=\"project-desc\">{description}</p>\
         <div class=\"project-meta\">{meta}</div>\
         <div class=\"project-actions\">{actions}</div>\
         </article>"
    )
}

fn meta_item(text: &str) -> String {
    format!("<span>{text}</span>")
}

fn hidden_attr(hidden: bool) -> &'static str {
    if hidden {
        " hidden"
    } else {
        ""
    }
}

/// Elapsed time in the coarsest applicable unit: days, hours, minutes,
/// else "just now". Anything under a minute renders "just now",
/// including a clock skew into the future.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let days = elapsed.num_days();
    if days > 0 {
        return plural(days, "day");
    }
    let hours = elapsed.num_hours();
    if hours > 0 {
        return plural(hours, "hour");
    }
    let minutes = elapsed.num_minutes();
    if minutes > 0 {
        return plural(minutes, "minute");
    }
    "just now".to_string()
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// The page shell served at `/`. Tagline, main, and footer start hidden;
/// the front-end unhides them when the visit reveals. The visit id rides
/// on `<body data-visit-id>` for the reporting script.
pub fn render_shell(visit_id: Uuid, config: &Config) -> String {
    let user = escape_html(&config.github_user);
    let tagline = escape_html(&config.tagline);
    format!(
        "<!doctype html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{user}</title>\n\
         <link rel=\"stylesheet\" href=\"/assets/style.css\">\n\
         </head>\n\
         <body data-visit-id=\"{visit_id}\">\n\
         <video class=\"bg-video\" src=\"/assets/intro.mp4\" autoplay muted loop playsinline></video>\n\
         <header>\n\
         <h1>{user}</h1>\n\
         <p class=\"tagline\" hidden>{tagline}</p>\n\
         <div class=\"intro-controls\">\n\
         <button id=\"audioToggle\" type=\"button\" aria-pressed=\"false\">🔇</button>\n\
         <button id=\"skipReveal\" type=\"button\">Skip intro</button>\n\
         </div>\n\
         </header>\n\
         <main hidden>\n\
         <h2>Projects</h2>\n\
         {projects}\n\
         </main>\n\
         <footer class=\"site-footer\" hidden>\n\
         <p><a href=\"https://github.com/{user}\" target=\"_blank\" rel=\"noopener\">github.com/{user}</a></p>\n\
         </footer>\n\
         <script src=\"/assets/page.js\" defer></script>\n\
         </body>\n\
         </html>\n",
        projects = region_html("", false, false),
    )
}

/// Minimal escaping for text and attribute values interpolated into HTML.
fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
