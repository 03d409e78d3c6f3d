//! Line protocol for the headless front end.

use anyhow::{anyhow, bail, Context};
use serde_json::{json, Value};
use tabwave_core::TabId;
use tabwave_shell::{BrowserShell, CommandId, Generation, OpenOptions};

/// Number of omnibox suggestions returned by `suggest`
const SUGGESTION_LIMIT: usize = 8;

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Open(Option<String>),
    OpenBackground(String),
    Navigate(String),
    Submit(String),
    Back,
    Forward,
    Reload,
    Home,
    Close(Option<TabId>),
    Focus(TabId),
    Bookmark,
    Unbookmark(String),
    Bookmarks,
    History,
    Forget(usize),
    ClearHistory,
    Ready {
        tab: TabId,
        generation: Generation,
        title: Option<String>,
    },
    Suggest(String),
    Palette(String),
    Run(CommandId),
    View,
    Quit,
}

impl Request {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());
        let required = |what: &str| arg.clone().ok_or_else(|| anyhow!("`{}` needs {}", verb, what));

        let request = match verb {
            "open" => Self::Open(arg.clone()),
            "bg" => Self::OpenBackground(required("a url")?),
            "nav" => Self::Navigate(required("a url")?),
            "go" => Self::Submit(required("some text")?),
            "back" => Self::Back,
            "forward" => Self::Forward,
            "reload" => Self::Reload,
            "home" => Self::Home,
            "close" => Self::Close(arg.as_deref().map(parse_tab).transpose()?),
            "focus" => Self::Focus(parse_tab(&required("a tab id")?)?),
            "bookmark" => Self::Bookmark,
            "unbookmark" => Self::Unbookmark(required("a url")?),
            "bookmarks" => Self::Bookmarks,
            "history" => Self::History,
            "forget" => Self::Forget(
                required("a history index")?
                    .parse()
                    .context("history index must be a number")?,
            ),
            "clear-history" => Self::ClearHistory,
            "ready" => parse_ready(rest)?,
            "suggest" => Self::Suggest(required("a query")?),
            "palette" => Self::Palette(arg.clone().unwrap_or_default()),
            "run" => Self::Run(required("a command")?.parse()?),
            "view" => Self::View,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command `{}`", other),
        };
        Ok(request)
    }
}

fn parse_tab(raw: &str) -> anyhow::Result<TabId> {
    raw.parse()
        .with_context(|| format!("`{}` is not a tab id", raw))
}

fn parse_ready(rest: &str) -> anyhow::Result<Request> {
    let mut parts = rest.splitn(3, char::is_whitespace);
    let tab = parse_tab(parts.next().unwrap_or_default())?;
    let generation = parts
        .next()
        .ok_or_else(|| anyhow!("`ready` needs a generation"))?
        .parse()
        .map(Generation)
        .context("generation must be a number")?;
    let title = parts
        .next()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string);

    Ok(Request::Ready {
        tab,
        generation,
        title,
    })
}

/// What the caller should do with a handled line
#[derive(Debug)]
pub enum Reply {
    Json(Value),
    Quit,
}

pub struct Driver {
    shell: BrowserShell,
}

impl Driver {
    pub fn new(shell: BrowserShell) -> Self {
        Self { shell }
    }

    #[cfg(test)]
    pub fn shell(&self) -> &BrowserShell {
        &self.shell
    }

    pub fn handle(&mut self, line: &str) -> anyhow::Result<Reply> {
        let request = Request::parse(line)?;
        log::debug!("Handling {:?}", request);
        self.dispatch(request)
    }

    fn dispatch(&mut self, request: Request) -> anyhow::Result<Reply> {
        let shell = &mut self.shell;

        let changed = match request {
            Request::Quit => return Ok(Reply::Quit),
            Request::View => return Ok(Reply::Json(json!(shell.view()))),
            Request::Bookmarks => return Ok(Reply::Json(json!(shell.state().bookmarks))),
            Request::History => return Ok(Reply::Json(json!(shell.state().history))),
            Request::Suggest(query) => {
                return Ok(Reply::Json(json!(shell.suggest(&query, SUGGESTION_LIMIT))));
            }
            Request::Palette(query) => {
                return Ok(Reply::Json(json!(shell.search_commands(&query))));
            }
            Request::Run(command) => {
                let outcome = shell.execute(command)?;
                return Ok(Reply::Json(json!({
                    "command": command,
                    "result": outcome,
                    "view": shell.view(),
                })));
            }
            Request::Open(url) => shell
                .open_tab(url.as_deref(), OpenOptions::default())?
                .is_some(),
            Request::OpenBackground(url) => shell
                .open_tab(Some(&url), OpenOptions::background())?
                .is_some(),
            Request::Navigate(url) => shell.navigate_active(&url)?.is_some(),
            Request::Submit(text) => shell.submit_address(&text)?.is_some(),
            Request::Back => shell.go_back()?,
            Request::Forward => shell.go_forward()?,
            Request::Reload => match shell.active_tab() {
                Some(id) => shell.reload(id)?.is_some(),
                None => false,
            },
            Request::Home => shell.go_home()?.is_some(),
            Request::Close(Some(id)) => shell.close_tab(id)?,
            Request::Close(None) => shell.close_active_tab()?,
            Request::Focus(id) => shell.focus_tab(id)?,
            Request::Bookmark => shell.toggle_active_bookmark()?.is_some(),
            Request::Unbookmark(url) => shell.remove_bookmark(&url)?,
            Request::Forget(index) => shell.remove_history_item(index)?,
            Request::ClearHistory => {
                shell.clear_history()?;
                true
            }
            Request::Ready {
                tab,
                generation,
                title,
            } => shell.content_ready(tab, generation, title.as_deref())?,
        };

        Ok(Reply::Json(json!({
            "changed": changed,
            "view": shell.view(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabwave_core::ShellConfig;
    use tabwave_storage::MemoryStore;

    fn driver() -> Driver {
        let config = ShellConfig {
            home: "https://home.test/".into(),
            content_endpoint: "https://pages.test/api/page".into(),
            ..ShellConfig::with_data_dir("/unused")
        };
        Driver::new(BrowserShell::new(&config, Box::new(MemoryStore::new())))
    }

    fn json(driver: &mut Driver, line: &str) -> Value {
        match driver.handle(line).unwrap() {
            Reply::Json(value) => value,
            Reply::Quit => panic!("unexpected quit for {}", line),
        }
    }

    #[test]
    fn test_parse_requests() {
        assert_eq!(Request::parse("open").unwrap(), Request::Open(None));
        assert_eq!(
            Request::parse("  nav   docs.rs ").unwrap(),
            Request::Navigate("docs.rs".into())
        );
        assert_eq!(
            Request::parse("go cat facts").unwrap(),
            Request::Submit("cat facts".into())
        );
        assert_eq!(Request::parse("close 4").unwrap(), Request::Close(Some(TabId(4))));
        assert_eq!(Request::parse("run new-tab").unwrap(), Request::Run(CommandId::NewTab));
        assert_eq!(
            Request::parse("ready 2 7 Hello World").unwrap(),
            Request::Ready {
                tab: TabId(2),
                generation: Generation(7),
                title: Some("Hello World".into()),
            }
        );
        assert_eq!(
            Request::parse("ready 2 7").unwrap(),
            Request::Ready {
                tab: TabId(2),
                generation: Generation(7),
                title: None,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(Request::parse("nav").is_err());
        assert!(Request::parse("focus abc").is_err());
        assert!(Request::parse("forget -1").is_err());
        assert!(Request::parse("ready 1").is_err());
        assert!(Request::parse("run teleport").is_err());
        assert!(Request::parse("dance").is_err());
    }

    #[test]
    fn test_session() {
        let mut driver = driver();

        let opened = json(&mut driver, "open a.test");
        assert_eq!(opened["changed"], true);
        assert_eq!(opened["view"]["address"], "https://a.test/");

        let submitted = json(&mut driver, "go cats");
        assert_eq!(submitted["view"]["address"], "cats");
        assert_eq!(submitted["view"]["toolbar"]["canGoBack"], true);

        let generation = submitted["view"]["content"]["generation"].as_u64().unwrap();
        let ready = json(&mut driver, &format!("ready 1 {} Cat Facts", generation));
        assert_eq!(ready["changed"], true);
        assert_eq!(ready["view"]["tabs"][0]["label"], "Cat Facts");

        let history = json(&mut driver, "history");
        assert_eq!(history.as_array().unwrap().len(), 1);

        let closed = json(&mut driver, "close");
        assert_eq!(closed["view"]["content"]["kind"], "placeholder");

        assert!(matches!(driver.handle("quit").unwrap(), Reply::Quit));
    }

    #[test]
    fn test_run_command() {
        let mut driver = driver();
        let reply = json(&mut driver, "run focus_address");
        assert_eq!(reply["result"]["outcome"], "focus_address_bar");

        let reply = json(&mut driver, "run new_tab");
        assert_eq!(reply["result"]["changed"], true);
        assert_eq!(driver.shell().state().tabs.len(), 1);
    }

    #[test]
    fn test_palette_and_suggest() {
        let mut driver = driver();
        let commands = json(&mut driver, "palette book");
        assert_eq!(commands[0]["id"], "toggle_bookmark");

        json(&mut driver, "open rust-lang.org");
        json(&mut driver, "nav docs.rs");
        let suggestions = json(&mut driver, "suggest docs");
        assert_eq!(suggestions[0]["url"], "https://docs.rs/");
        assert_eq!(suggestions[0]["source"], "history");
    }
}
