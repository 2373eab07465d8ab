use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codepanel_core::{EditorPanel, SharePayload, TextBuffer};
use codepanel_settings::{LanguageCatalog, PanelConfig, PreferenceStore};
use codepanel_storage::FileStore;

#[derive(Parser)]
#[command(
    name = "codepanel-cli",
    about = "Headless driver for the code editor panel",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示某語言目前的程式碼。 / Print the code the editor would show for a language.
    Show(LanguageArgs),
    /// 以編輯事件寫入程式碼。 / Feed an edit through the debounced save pipeline.
    Edit(EditArgs),
    /// 還原預設程式碼並刪除保存的內容。 / Restore the default code and forget saved edits.
    Reset(LanguageArgs),
    /// 設定字型大小（限制在 12 到 24）。 / Set the font size (clamped to 12..=24).
    FontSize(FontSizeArgs),
    /// 切換目前語言。 / Switch the active language.
    Language(IdArgs),
    /// 切換主題。 / Switch the editor theme.
    Theme(IdArgs),
    /// 列出可用語言。 / List available languages.
    Languages,
    /// 以 JSON 輸出分享內容。 / Print the share payload as JSON.
    Share(LanguageArgs),
    /// 顯示目前偏好設定。 / Show the active preferences.
    Status,
}

#[derive(Args)]
struct LanguageArgs {
    /// 要操作的語言；預設為目前語言。 / Language to act on (defaults to the active one).
    #[arg(long)]
    language: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    #[arg(long)]
    language: Option<String>,

    /// 新的緩衝區內容。 / New buffer contents.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    text: Option<String>,

    /// 從檔案讀取緩衝區內容。 / Read the buffer contents from a file.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct FontSizeArgs {
    #[arg(allow_hyphen_values = true)]
    size: i64,
}

#[derive(Args)]
struct IdArgs {
    id: String,
}

/// 一次指令執行期間掛載的面板。 / Panel mounted for the duration of one command.
struct Session {
    panel: EditorPanel<FileStore>,
    buffer: Rc<RefCell<TextBuffer>>,
}

impl Session {
    fn open(workspace_root: &Path) -> Result<Self> {
        let config_path = config_path(workspace_root);
        let config = PanelConfig::load(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;
        let catalog = match &config.languages {
            Some(path) => {
                let path = data_dir(workspace_root).join(path);
                LanguageCatalog::load(&path).with_context(|| {
                    format!("failed to load language catalog {}", path.display())
                })?
            }
            None => LanguageCatalog::builtin(),
        };
        let storage_dir = storage_dir(workspace_root);
        let storage = FileStore::open_or_recover(&storage_dir, &config.origin);
        log::debug!(
            "opened storage for origin '{}' at {}",
            storage.origin(),
            storage.path().display()
        );

        let store = Rc::new(RefCell::new(PreferenceStore::new(
            config.initial_preferences(),
        )));
        let mut panel = EditorPanel::new(store, storage, catalog, &config);
        panel.set_session_loaded(true);
        let buffer = TextBuffer::new().into_shared();
        panel.on_mount(buffer.clone());
        Ok(Self { panel, buffer })
    }

    fn switch_to(&mut self, language: Option<&str>) -> Result<String> {
        if let Some(language) = language {
            if !self.panel.catalog().contains(language) {
                bail!("unknown language '{language}'");
            }
            self.panel.select_language(language);
        }
        Ok(self.panel.store().borrow().language().to_string())
    }

    /// 檢視語言而不改變目前語言。 / Resolves a language to view without making it active.
    fn peek(&self, language: Option<&str>) -> Result<(String, String)> {
        match language {
            Some(language) => {
                if !self.panel.catalog().contains(language) {
                    bail!("unknown language '{language}'");
                }
                Ok((language.to_string(), self.panel.code_for(language)))
            }
            None => {
                let active = self.panel.store().borrow().language().to_string();
                Ok((active, self.code()))
            }
        }
    }

    fn code(&self) -> String {
        self.buffer.borrow().text().to_string()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { workspace, command } = Cli::parse();
    let workspace_root = resolve_workspace(workspace)?;
    let mut session = Session::open(&workspace_root)?;
    match command {
        Commands::Show(args) => execute_show(&session, args),
        Commands::Edit(args) => execute_edit(&mut session, args),
        Commands::Reset(args) => execute_reset(&mut session, args),
        Commands::FontSize(args) => {
            let size = session.panel.change_font_size(args.size);
            println!("Font size set to {size}");
            Ok(())
        }
        Commands::Language(args) => {
            let language = session.switch_to(Some(&args.id))?;
            println!("Active language: {language}");
            Ok(())
        }
        Commands::Theme(args) => {
            if args.id.trim().is_empty() {
                bail!("theme id must not be empty");
            }
            session.panel.select_theme(&args.id);
            println!("Theme set to {}", args.id);
            Ok(())
        }
        Commands::Languages => {
            execute_languages(&session);
            Ok(())
        }
        Commands::Share(args) => execute_share(&mut session, args),
        Commands::Status => {
            let store = session.panel.store().borrow();
            println!("Language: {}", store.language());
            println!("Theme: {}", store.theme());
            println!("Font size: {}", store.font_size());
            Ok(())
        }
    }?;
    session.panel.unmount();
    Ok(())
}

fn execute_show(session: &Session, args: LanguageArgs) -> Result<()> {
    let (_, code) = session.peek(args.language.as_deref())?;
    print!("{code}");
    if !code.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn execute_edit(session: &mut Session, args: EditArgs) -> Result<()> {
    let language = session.switch_to(args.language.as_deref())?;
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => bail!("either --text or --file is required"),
    };

    if text.is_empty() {
        println!("Nothing to save for {language}: buffer is empty");
        return Ok(());
    }

    let now = Instant::now();
    session.buffer.borrow_mut().clear();
    let typed = session.buffer.borrow_mut().type_text(&text);
    session.panel.on_change(Some(typed.as_str()), now);
    let written = session.panel.tick(now + session.panel.saver().delay());
    if written == 0 {
        bail!("failed to save code for {language}");
    }
    println!("Saved {} bytes for {language}", typed.len());
    Ok(())
}

fn execute_reset(session: &mut Session, args: LanguageArgs) -> Result<()> {
    let language = session.switch_to(args.language.as_deref())?;
    session.panel.reset();
    println!("Reset {language} to its default code");
    Ok(())
}

fn execute_languages(session: &Session) {
    let active = session.panel.store().borrow().language().to_string();
    println!("Available languages:");
    for profile in session.panel.catalog().iter() {
        let marker = if profile.id == active { '*' } else { ' ' };
        println!("{marker} {} ({})", profile.id, profile.label);
    }
}

fn execute_share(session: &mut Session, args: LanguageArgs) -> Result<()> {
    let payload = match args.language.as_deref() {
        Some(language) => {
            let (language, code) = session.peek(Some(language))?;
            SharePayload { language, code }
        }
        None => {
            let Some(payload) = session.panel.share_payload() else {
                bail!("editor is not ready");
            };
            payload
        }
    };
    session.panel.open_share_dialog();
    let json = serde_json::to_string_pretty(&payload).context("failed to encode payload")?;
    println!("{json}");
    session.panel.close_share_dialog();
    Ok(())
}

fn data_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".codepanel")
}

fn config_path(workspace_root: &Path) -> PathBuf {
    data_dir(workspace_root).join("config.json")
}

fn storage_dir(workspace_root: &Path) -> PathBuf {
    data_dir(workspace_root).join("storage")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => {
            if path.is_absolute() {
                Ok(path)
            } else {
                Ok(std::env::current_dir()
                    .context("determine current directory")?
                    .join(path))
            }
        }
        None => std::env::current_dir().context("determine current directory"),
    }
}
