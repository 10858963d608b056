use std::{
    ffi::OsString,
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Sources compiled by default, in order. Each `<stem>.ts` produces `<stem>.wasm`.
pub const DEFAULT_FIXTURE_STEMS: [&str; 18] = [
    "abi_classes",
    "abi_store_value",
    "abi_types",
    "big_int_arithmetic",
    "big_int_to_hex",
    "big_int_to_string",
    "bytes_to_base58",
    "contract_calls",
    "crypto",
    "data_source_create",
    "ens_name_by_hash",
    "ipfs_cat",
    "ipfs_map",
    "json_parsing",
    "non_terminating",
    "store",
    "string_to_number",
    "test_padding",
];

pub const DEFAULT_COMPILER: &str = "asc";
pub const DEFAULT_OUTPUT_FLAG: &str = "-b";

/// One compiler invocation: a single source file and the artifact it produces.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixture {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Fixture {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), output: output.into() }
    }

    pub fn from_stem(stem: &str) -> Self {
        Self::new(format!("{stem}.ts"), format!("{stem}.wasm"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Program to run, looked up on `PATH` unless it contains a path separator.
    pub program: PathBuf,
    /// Flags passed to every invocation after the source file.
    pub flags: Vec<String>,
    /// Flag naming the output artifact.
    pub output_flag: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_COMPILER),
            flags: ["--exportRuntime", "--runtime", "stub"].map(String::from).to_vec(),
            output_flag: DEFAULT_OUTPUT_FLAG.to_owned(),
        }
    }
}

impl CompilerConfig {
    /// Arguments for compiling `fixture`: `<source> <flags..> <output_flag> <output>`.
    pub fn args(&self, fixture: &Fixture) -> Vec<OsString> {
        let mut args = Vec::with_capacity(self.flags.len() + 3);
        args.push(fixture.source.clone().into_os_string());
        args.extend(self.flags.iter().map(OsString::from));
        args.push(OsString::from(&self.output_flag));
        args.push(fixture.output.clone().into_os_string());
        args
    }

    /// The invocation as it would be typed into a shell, for logging.
    pub fn command_line(&self, fixture: &Fixture) -> String {
        std::iter::once(self.program.as_os_str().to_owned())
            .chain(self.args(fixture))
            .map(|arg| arg.to_string_lossy().into_owned())
            .join(" ")
    }
}

/// The compiler to use and the fixtures to build with it, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub compiler: CompilerConfig,
    #[serde(default = "default_fixtures")]
    pub fixtures: Vec<Fixture>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self { compiler: CompilerConfig::default(), fixtures: default_fixtures() }
    }
}

impl Manifest {
    pub fn from_yaml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let f = File::open(path)
            .with_context(|| format!("Failed to open manifest {}", path.display()))?;
        serde_yaml::from_reader(f)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }
}

pub fn default_fixtures() -> Vec<Fixture> {
    DEFAULT_FIXTURE_STEMS.iter().map(|stem| Fixture::from_stem(stem)).collect()
}
