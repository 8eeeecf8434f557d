use serde::Deserialize;
use url_clipper::picker::script::locate_script;
use url_clipper::picker::{install, poller};
use url_clipper::{BrowserSession, LaunchOptions, Locator};

#[derive(Debug, Deserialize)]
struct Vector {
    name: String,
    html: String,
    css: String,
    xpath: String,
}

fn data_url(html: &str) -> String {
    format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html))
}

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_page_locators_match_vectors() {
    let vectors: Vec<Vector> = serde_json::from_str(include_str!("fixtures/locator_vectors.json")).unwrap();
    let session = launch();

    for vector in vectors {
        session.open(&data_url(&vector.html)).expect("Failed to open page");
        install(session.tab().as_ref(), false).expect("Failed to install picker");

        let value = session.evaluate(&locate_script("[data-pick]")).expect("Failed to locate");
        let locator: Locator = serde_json::from_value(value).expect("No target in page");

        assert_eq!(locator.css, vector.css, "css for '{}'", vector.name);
        assert_eq!(locator.xpath, vector.xpath, "xpath for '{}'", vector.name);
    }
}

#[test]
#[ignore]
fn test_reinjection_only_toggles() {
    let session = launch();
    session.open(&data_url("<body><p>x</p></body>")).unwrap();
    let tab = session.tab();

    let first = install(tab.as_ref(), true).unwrap();
    assert!(first.installed && first.enabled);

    let second = install(tab.as_ref(), false).unwrap();
    assert!(!second.installed && !second.enabled);

    let overlays = session
        .evaluate("JSON.stringify(document.querySelectorAll('#__url_clipper_overlay__').length)")
        .unwrap();
    assert_eq!(overlays, 1);

    let snapshot = poller::poll_once(tab.as_ref()).unwrap();
    assert!(!snapshot.enabled);
    assert!(snapshot.hover.is_none() && snapshot.pick.is_none());

    let test_slot = session.evaluate("JSON.stringify(window.__URL_CLIPPER_TEST__)").unwrap();
    assert_eq!(test_slot["enabled"], true);
}

#[test]
#[ignore]
fn test_double_click_confirms_and_disables() {
    let session = launch();
    session
        .open(&data_url(r#"<body><div class="content"><p id="pick-me">hello</p></div></body>"#))
        .unwrap();
    let tab = session.tab();
    install(tab.as_ref(), true).unwrap();

    session
        .evaluate(
            "JSON.stringify((function () { var el = document.getElementById('pick-me'); \
             el.dispatchEvent(new MouseEvent('click', {bubbles: true})); \
             el.dispatchEvent(new MouseEvent('dblclick', {bubbles: true})); return true; })())",
        )
        .unwrap();

    let snapshot = poller::poll_once(tab.as_ref()).unwrap();
    let pick = snapshot.pick.expect("pick recorded");
    assert!(pick.is_confirmed());
    assert_eq!(pick.css, "#pick-me");
    assert_eq!(pick.xpath, r#"//*[@id="pick-me"]"#);
    assert!(!snapshot.enabled);
}
