//! Form relevance tests against whole documents

use fillscan::analyzer::{analyze, FormAnalyzer};
use fillscan::config::Config;
use fillscan::dom::Page;
use fillscan::rules::default_rules;

fn score(html: &str, selector: &str) -> f64 {
    score_at("https://example.com/", html, selector)
}

fn score_at(url: &str, html: &str, selector: &str) -> f64 {
    let page = Page::parse(url, html);
    let input = page.find(selector).unwrap();
    let form = page.owning_form(input);
    analyze(&page, form, input).total_signal
}

// ============================================================================
// Forms
// ============================================================================

const SIGNUP_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Acme</title></head>
<body>
    <form id="signup" action="/accounts">
        <label for="email">Email address</label>
        <input id="email" type="email" name="email">
        <button type="submit">Sign up</button>
    </form>
</body>
</html>
"#;

const LOGIN_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Acme</title></head>
<body>
    <form id="login-form">
        <input id="user" name="username">
        <input id="pass" type="password" name="password">
        <button>Log in</button>
        <a href="/forgot">Forgot password?</a>
    </form>
</body>
</html>
"#;

#[test]
fn test_signup_form_is_positive() {
    // form id +3, submit +2, button text +1
    assert_eq!(score(SIGNUP_HTML, "#email"), 6.0);
}

#[test]
fn test_login_form_is_negative() {
    // form id -3, submit -2, button text -1
    assert_eq!(score(LOGIN_HTML, "#user"), -6.0);
}

#[test]
fn test_contributions_replay_to_total() {
    let page = Page::parse("https://example.com/", SIGNUP_HTML);
    let input = page.find("#email").unwrap();
    let result = analyze(&page, page.owning_form(input), input);

    let replayed: f64 = result.contributions.iter().map(|c| c.delta).sum();
    assert_eq!(replayed, result.total_signal);
    assert!(result
        .contributions
        .iter()
        .any(|c| c.description == "FORM attr: id=signup" && c.delta == 3.0));
    assert!(result
        .contributions
        .iter()
        .any(|c| c.description == "submit: Sign up" && c.delta == 2.0));
}

#[test]
fn test_login_link_flips_to_positive() {
    let html = r#"
        <form id="f">
            <input id="email" type="email">
            <p>Already have an account? <a href="/login">Log in</a></p>
        </form>
    "#;
    assert_eq!(score(html, "#email"), 1.0);
}

#[test]
fn test_in_page_anchor_is_not_flipped() {
    let html = r##"
        <form id="f">
            <input id="email" type="email">
            <a href="#login">Log in</a>
        </form>
    "##;
    // Plain text: -1 instead of the +1 an off-page link would give
    assert_eq!(score(html, "#email"), -1.0);
}

#[test]
fn test_unified_text_in_form() {
    let html = r#"
        <form>
            <input id="email" name="email">
            <p>Sign in or sign up</p>
            <button type="button">Continue</button>
        </form>
    "#;
    let page = Page::parse("https://example.com/", html);
    let input = page.find("#email").unwrap();
    let result = analyze(&page, page.owning_form(input), input);

    assert_eq!(result.total_signal, -3.0);
    assert!(result.contributions[0].description.starts_with("Unified detected"));
}

#[test]
fn test_unified_input_attribute() {
    let html = r#"
        <form>
            <input id="email" aria-label="Sign in or sign up with email">
        </form>
    "#;
    // input attribute strength 3 plus the unified penalty
    assert_eq!(score(html, "#email"), -5.0);
}

#[test]
fn test_skipped_tags_contribute_nothing() {
    let html = r#"
        <form>
            <input id="email" type="email">
            <select><option>Sign up</option><option>Log in</option></select>
            <script>var label = "Log in";</script>
            <noscript>Log in</noscript>
            <button type="button">Next</button>
        </form>
    "#;
    assert_eq!(score(html, "#email"), 0.0);
}

// ============================================================================
// Headings
// ============================================================================

#[test]
fn test_heading_breaks_tie() {
    let html = r#"
        <h2>Join our community</h2>
        <form><input id="email" type="email"></form>
    "#;
    assert_eq!(score(html, "#email"), 0.5);
}

#[test]
fn test_headings_ignored_when_form_decided() {
    let html = r#"
        <h2>Log in</h2>
        <form>
            <input id="email" type="email">
            <button>Subscribe</button>
        </form>
    "#;
    assert_eq!(score(html, "#email"), 3.0);
}

#[test]
fn test_unified_heading_blocks_tie_break() {
    let html = r#"
        <h1>Log in or sign up</h1>
        <form><input id="email" type="email"></form>
    "#;
    // heading strength 0.5 plus the unified penalty
    assert_eq!(score(html, "#email"), -2.5);
}

// ============================================================================
// Formless inputs
// ============================================================================

#[test]
fn test_formless_page_signals() {
    let html = r#"
        <html>
        <head><title>Join the waitlist</title></head>
        <body>
            <h1>Sign up for updates</h1>
            <input id="email" type="email" placeholder="you@example.com">
            <button>Subscribe</button>
        </body>
        </html>
    "#;
    // title +2, heading +0.5, orphan button: submit +2 and text +1
    assert_eq!(score(html, "#email"), 5.5);
}

#[test]
fn test_buttons_of_other_forms_ignored() {
    let html = r#"
        <html>
        <head><title>Newsletter</title></head>
        <body>
            <input id="email" type="email">
            <form><button>Log in</button></form>
        </body>
        </html>
    "#;
    assert_eq!(score(html, "#email"), 2.0);
}

// ============================================================================
// Provider pages and configuration
// ============================================================================

#[test]
fn test_provider_signup_page_short_circuits() {
    let url = "https://quack.duckduckgo.com/email/signup";
    let page = Page::parse(url, LOGIN_HTML);
    let input = page.find("#user").unwrap();
    let result = analyze(&page, page.owning_form(input), input);

    assert_eq!(result.total_signal, 0.0);
    assert!(result.contributions.is_empty());
    assert!(!result.is_eligible());
}

#[test]
fn test_configured_weights() {
    let config = Config::parse("[weights]\nsubmit = 5.0\n").unwrap();
    let analyzer = FormAnalyzer::new(default_rules(), &config).unwrap();

    let page = Page::parse("https://example.com/", SIGNUP_HTML);
    let input = page.find("#email").unwrap();
    let result = analyzer.analyze(&page, page.owning_form(input), input);

    assert_eq!(result.total_signal, 9.0);
}

#[test]
fn test_analysis_is_deterministic() {
    assert_eq!(score(LOGIN_HTML, "#user"), score(LOGIN_HTML, "#user"));
    assert_eq!(score_at("https://a.example/", SIGNUP_HTML, "#email"), 6.0);
}

#[test]
fn test_title_like_class_and_id_count_as_headings() {
    let html = r#"
        <div class="page-title">Join us</div>
        <span id="main-title">Sign up today</span>
        <form><input id="email" type="email"></form>
    "#;
    assert_eq!(score(html, "#email"), 1.0);
}

#[test]
fn test_title_like_heading_on_formless_page() {
    let html = r#"
        <p class="section-title">Log in</p>
        <input id="email" type="email">
    "#;
    assert_eq!(score(html, "#email"), -0.5);
}
