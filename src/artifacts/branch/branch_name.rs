use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::TwigError;
use derive_new::new;
use std::sync::LazyLock;

const REF_PREFIX: &str = "refs/heads/";

/// Name of the branch every repository starts on
pub const DEFAULT_BRANCH: &str = "master";

static INVALID_BRANCH_NAME: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(INVALID_BRANCH_NAME_REGEX).ok());

/// Target of a symbolic ref, e.g. `refs/heads/master`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, new)]
pub struct SymRefName(String);

impl SymRefName {
    pub fn as_ref_path(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> crate::errors::Result<Self> {
        let is_invalid = match INVALID_BRANCH_NAME.as_ref() {
            Some(re) => re.is_match(&name),
            None => {
                return Err(TwigError::invariant(format!(
                    "invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"
                )));
            }
        };

        if name.is_empty() || is_invalid {
            Err(TwigError::InvalidBranchName { name })
        } else {
            Ok(Self(name))
        }
    }

    pub fn try_parse_sym_ref_name(sym_ref_name: &SymRefName) -> crate::errors::Result<Self> {
        match sym_ref_name.0.strip_prefix(REF_PREFIX) {
            Some(name) => Self::try_parse(name.to_string()),
            None => Err(TwigError::invariant(format!(
                "symbolic ref name must start with '{REF_PREFIX}', got '{}'",
                sym_ref_name.0
            ))),
        }
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    pub fn to_sym_ref_name(&self) -> SymRefName {
        SymRefName::new(format!("{REF_PREFIX}{}", self.0))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
