/// Sends the user to the authorization page.
pub trait Navigator: Send + Sync {
    fn open(&self, url: &str) -> Result<(), String>;
}

/// Opens URLs in the default system browser.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn open(&self, url: &str) -> Result<(), String> {
        webbrowser::open(url).map_err(|e| e.to_string())
    }
}
