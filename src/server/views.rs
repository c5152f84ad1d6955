//! HTML Rendering
//!
//! Hand-built HTML strings for the demo pages. Values are interpolated
//! without escaping, matching the demonstration scope of the app.

use crate::config::Environment;
use crate::types::Contact;

/// Landing page. `authorized_section` is rendered between the toggle
/// controls and the install link when the session holds tokens.
pub fn home_page(env: Environment, authorized_section: Option<String>) -> String {
    let mut page = String::new();
    page.push_str("<h1>HubSpot OAuth 2.0 Quickstart</h1>\n");
    page.push_str(&format!("<h2>Active HubSpot env: {}</h2>\n", env));
    page.push_str(
        "<p>Toggle between the HubSpot QA and PROD hosts used for OAuth and API calls</p>\n",
    );
    page.push_str("<button id=\"env-toggle-btn\">Toggle HubSpot env</button>\n");
    page.push_str(
        "<script>\n\
         document.getElementById(\"env-toggle-btn\").addEventListener(\"click\", () => {\n\
           fetch('/env-toggle')\n\
             .then(response => response.json())\n\
             .then(data => console.log(data));\n\
         });\n\
         </script>\n",
    );
    if let Some(section) = authorized_section {
        page.push_str(&section);
    }
    page.push_str("<p>If you switch environments you might need to reinstall the app</p>\n");
    page.push_str("<a href=\"/install\"><h3>Install the app</h3></a>\n");
    page.push_str("<h2 style='color:red'>After toggling environments refresh the page</h2>\n");
    page
}

/// Token banner plus the contact line for an authorized session.
pub fn authorized_section(access_token: &str, contact_line: &str) -> String {
    format!(
        "<h4>Access token: {}</h4>\n{}\n",
        access_token, contact_line
    )
}

pub fn contact_line(contact: &Contact) -> String {
    format!("<p>Contact name: {}</p>", contact.display_name())
}

pub fn contact_error_line(message: &str) -> String {
    format!("<p>Unable to retrieve contact! Error Message: {}</p>", message)
}

/// `/error` page; the message is rendered verbatim.
pub fn error_page(message: &str) -> String {
    format!("<h4>Error: {}</h4>", message)
}

/// Direct response for a callback that arrived without a code.
pub fn missing_code_page() -> String {
    "<h4>Error: the callback did not include an authorization code</h4>".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_page_shows_environment_and_controls() {
        let page = home_page(Environment::Qa, None);
        assert!(page.contains("Active HubSpot env: QA"));
        assert!(page.contains("env-toggle-btn"));
        assert!(page.contains("/install"));
        assert!(!page.contains("Access token"));
    }

    #[test]
    fn test_home_page_includes_authorized_section() {
        let section = authorized_section("tok-1", "<p>Contact name: Ada Lovelace</p>");
        let page = home_page(Environment::Prod, Some(section));
        assert!(page.contains("Access token: tok-1"));
        assert!(page.contains("Contact name: Ada Lovelace"));
    }

    #[test]
    fn test_error_page_is_verbatim() {
        assert_eq!(error_page("Foo"), "<h4>Error: Foo</h4>");
    }
}
