use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read language catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse language catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("language entry has an empty id")]
    EmptyId,
    #[error("language '{0}' is defined more than once")]
    Duplicate(String),
}

/// Describes one selectable language and the code it starts with.
/// （描述一個可選語言及其預設程式碼。）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub logo_path: String,
    /// Syntax-highlighting mode handed to the widget.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub default_code: String,
}

impl LanguageProfile {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            logo_path: format!("/{id}.png"),
            mode: id.clone(),
            label: label.into(),
            default_code: String::new(),
            id,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn with_default_code(mut self, code: impl Into<String>) -> Self {
        self.default_code = code.into();
        self
    }
}

/// Read-only lookup from language id to profile.
/// （由語言識別碼查詢設定檔的唯讀目錄。）
#[derive(Debug, Clone, Default)]
pub struct LanguageCatalog {
    entries: BTreeMap<String, LanguageProfile>,
}

impl LanguageCatalog {
    pub fn new(profiles: Vec<LanguageProfile>) -> Result<Self, CatalogError> {
        let mut entries = BTreeMap::new();
        for profile in profiles {
            if profile.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if entries.contains_key(&profile.id) {
                return Err(CatalogError::Duplicate(profile.id));
            }
            entries.insert(profile.id.clone(), profile);
        }
        Ok(Self { entries })
    }

    /// Parses a JSON array of profiles.
    /// （解析 JSON 陣列形式的語言設定。）
    pub fn from_json_str(contents: &str) -> Result<Self, CatalogError> {
        let profiles: Vec<LanguageProfile> = serde_json::from_str(contents)?;
        Self::new(profiles)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Returns the languages shipped with the panel.
    /// （回傳面板內建的語言清單。）
    pub fn builtin() -> Self {
        let profiles = vec![
            LanguageProfile::new("javascript", "JavaScript").with_default_code(
                "// JavaScript Playground\nconst numbers = [1, 2, 3, 4, 5];\n\nconst squares = numbers.map((n) => n * n);\nconsole.log('Squares:', squares);\n",
            ),
            LanguageProfile::new("typescript", "TypeScript").with_default_code(
                "// TypeScript Playground\ninterface User {\n  name: string;\n  age: number;\n}\n\nconst user: User = { name: 'Ada', age: 36 };\nconsole.log(`${user.name} is ${user.age}`);\n",
            ),
            LanguageProfile::new("python", "Python").with_default_code(
                "# Python Playground\nnumbers = [1, 2, 3, 4, 5]\n\nsquares = [n * n for n in numbers]\nprint(f\"Squares: {squares}\")\n",
            ),
            LanguageProfile::new("java", "Java").with_default_code(
                "public class Main {\n    public static void main(String[] args) {\n        int[] numbers = {1, 2, 3, 4, 5};\n        int sum = 0;\n        for (int n : numbers) {\n            sum += n;\n        }\n        System.out.println(\"Sum: \" + sum);\n    }\n}\n",
            ),
            LanguageProfile::new("go", "Go").with_default_code(
                "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tnumbers := []int{1, 2, 3, 4, 5}\n\tsum := 0\n\tfor _, n := range numbers {\n\t\tsum += n\n\t}\n\tfmt.Println(\"Sum:\", sum)\n}\n",
            ),
            LanguageProfile::new("rust", "Rust").with_default_code(
                "fn main() {\n    let numbers = vec![1, 2, 3, 4, 5];\n    let sum: i32 = numbers.iter().sum();\n    println!(\"Sum: {}\", sum);\n}\n",
            ),
            LanguageProfile::new("cpp", "C++").with_default_code(
                "#include <iostream>\n#include <vector>\n\nint main() {\n    std::vector<int> numbers = {1, 2, 3, 4, 5};\n    int sum = 0;\n    for (int n : numbers) sum += n;\n    std::cout << \"Sum: \" << sum << std::endl;\n    return 0;\n}\n",
            ),
            LanguageProfile::new("csharp", "C#").with_default_code(
                "using System;\nusing System.Linq;\n\nclass Program {\n    static void Main() {\n        var numbers = new[] { 1, 2, 3, 4, 5 };\n        Console.WriteLine($\"Sum: {numbers.Sum()}\");\n    }\n}\n",
            ),
            LanguageProfile::new("ruby", "Ruby").with_default_code(
                "# Ruby Playground\nnumbers = [1, 2, 3, 4, 5]\nputs \"Squares: #{numbers.map { |n| n * n }}\"\n",
            ),
            LanguageProfile::new("swift", "Swift").with_default_code(
                "// Swift Playground\nlet numbers = [1, 2, 3, 4, 5]\nlet squares = numbers.map { $0 * $0 }\nprint(\"Squares: \\(squares)\")\n",
            ),
        ];
        let entries = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&LanguageProfile> {
        self.entries.get(id)
    }

    /// Default source for `id`; unknown languages start empty.
    pub fn default_code(&self, id: &str) -> &str {
        self.get(id)
            .map(|profile| profile.default_code.as_str())
            .unwrap_or("")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
