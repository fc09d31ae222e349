//! Name-to-capability resolution for filters and actions.
//!
//! The registry is the single place that knows every filter and action
//! name. Rules are compiled through it before any entry is walked, so an
//! unknown name or a bad parameter table rejects the rule up front.

use crate::actions::copy::CopyAction;
use crate::actions::delete::DeleteAction;
use crate::actions::echo::EchoAction;
use crate::actions::r#move::MoveAction;
use crate::actions::rename::RenameAction;
use crate::actions::shell::ShellAction;
use crate::actions::stop::StopAction;
use crate::actions::trash::TrashAction;
use crate::actions::write::WriteAction;
use crate::actions::CompiledAction;
use crate::config::{CapabilitySpec, Targets};
use crate::error::ConfigError;
use crate::filters::dates::{DateFilter, Stamp};
use crate::filters::empty::EmptyFilter;
use crate::filters::extension::ExtensionFilter;
use crate::filters::mimetype::MimetypeFilter;
use crate::filters::name::NameFilter;
use crate::filters::regex::RegexFilter;
use crate::filters::size::SizeFilter;
use crate::filters::CompiledFilter;

/// All registered filter names, for diagnostics.
pub const FILTER_NAMES: &[&str] = &[
    "created",
    "empty",
    "extension",
    "lastmodified",
    "mimetype",
    "name",
    "regex",
    "size",
];

/// All registered action names, for diagnostics.
pub const ACTION_NAMES: &[&str] = &[
    "copy", "delete", "echo", "move", "rename", "shell", "stop", "trash", "write",
];

/// Filter names that only make sense for file targets.
const FILE_ONLY_FILTERS: &[&str] = &["extension", "mimetype"];

/// Action names after which no further action may follow.
const TERMINAL_ACTIONS: &[&str] = &["delete", "trash"];

/// Resolve and construct one filter from its config spec.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownFilter`] for an unregistered name,
/// [`ConfigError::TargetsMismatch`] for a file-only filter on a
/// directories-only rule, or the filter's own parameter error.
pub fn compile_filter(
    spec: &CapabilitySpec,
    targets: Targets,
) -> Result<CompiledFilter, ConfigError> {
    if FILE_ONLY_FILTERS.contains(&spec.name.as_str()) && !targets.includes_files() {
        return Err(ConfigError::TargetsMismatch {
            capability: spec.name.clone(),
            targets: targets.to_string(),
        });
    }
    let inner: Box<dyn crate::filters::Filter> = match spec.name.as_str() {
        "created" => Box::new(DateFilter::from_params(Stamp::Created, &spec.params)?),
        "empty" => Box::new(EmptyFilter::from_params(&spec.params)?),
        "extension" => Box::new(ExtensionFilter::from_params(&spec.params)?),
        "lastmodified" => Box::new(DateFilter::from_params(Stamp::Modified, &spec.params)?),
        "mimetype" => Box::new(MimetypeFilter::from_params(&spec.params)?),
        "name" => Box::new(NameFilter::from_params(&spec.params)?),
        "regex" => Box::new(RegexFilter::from_params(&spec.params)?),
        "size" => Box::new(SizeFilter::from_params(&spec.params)?),
        other => return Err(ConfigError::UnknownFilter(other.to_string())),
    };
    Ok(CompiledFilter::new(spec.name.clone(), spec.not, inner))
}

/// Resolve and construct one action from its config spec.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownAction`] for an unregistered name,
/// [`ConfigError::BadParams`] for a negated action or a terminal action
/// that is not last in the chain, or the action's own parameter error.
pub fn compile_action(
    spec: &CapabilitySpec,
    is_last: bool,
) -> Result<CompiledAction, ConfigError> {
    if spec.not {
        return Err(ConfigError::BadParams {
            capability: spec.name.clone(),
            message: "actions cannot be negated".to_string(),
        });
    }
    if TERMINAL_ACTIONS.contains(&spec.name.as_str()) && !is_last {
        return Err(ConfigError::BadParams {
            capability: spec.name.clone(),
            message: "must be the last action of the rule".to_string(),
        });
    }
    let inner: Box<dyn crate::actions::Action> = match spec.name.as_str() {
        "copy" => Box::new(CopyAction::from_params(&spec.params)?),
        "delete" => Box::new(DeleteAction::from_params(&spec.params)?),
        "echo" => Box::new(EchoAction::from_params(&spec.params)?),
        "move" => Box::new(MoveAction::from_params(&spec.params)?),
        "rename" => Box::new(RenameAction::from_params(&spec.params)?),
        "shell" => Box::new(ShellAction::from_params(&spec.params)?),
        "stop" => Box::new(StopAction::from_params(&spec.params)?),
        "trash" => Box::new(TrashAction::from_params(&spec.params)?),
        "write" => Box::new(WriteAction::from_params(&spec.params)?),
        other => return Err(ConfigError::UnknownAction(other.to_string())),
    };
    Ok(CompiledAction::new(spec.name.clone(), inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Table;

    fn spec(name: &str, params: &str) -> CapabilitySpec {
        CapabilitySpec {
            name: name.to_string(),
            not: false,
            params: params.parse::<Table>().unwrap(),
        }
    }

    #[test]
    fn every_registered_filter_name_resolves() {
        let cases = [
            ("created", "days = 1"),
            ("empty", ""),
            ("extension", r#"extensions = "pdf""#),
            ("lastmodified", "days = 1"),
            ("mimetype", r#"types = "image""#),
            ("name", r#"contains = "x""#),
            ("regex", r#"expr = "a""#),
            ("size", r#"conditions = "> 0""#),
        ];
        assert_eq!(cases.len(), FILTER_NAMES.len());
        for (name, params) in cases {
            compile_filter(&spec(name, params), Targets::Files).unwrap();
        }
    }

    #[test]
    fn every_registered_action_name_resolves() {
        let cases = [
            ("copy", r#"dest = "/x/""#),
            ("delete", ""),
            ("echo", r#"message = "m""#),
            ("move", r#"dest = "/x/""#),
            ("rename", r#"name = "n""#),
            ("shell", r#"command = "true""#),
            ("stop", ""),
            ("trash", ""),
            ("write", "text = \"t\"\npath = \"/x/f\""),
        ];
        assert_eq!(cases.len(), ACTION_NAMES.len());
        for (name, params) in cases {
            compile_action(&spec(name, params), true).unwrap();
        }
    }

    #[test]
    fn unknown_names_are_rejected_at_compile_time() {
        assert!(matches!(
            compile_filter(&spec("exif", ""), Targets::Files),
            Err(ConfigError::UnknownFilter(_))
        ));
        assert!(matches!(
            compile_action(&spec("upload", ""), true),
            Err(ConfigError::UnknownAction(_))
        ));
    }

    #[test]
    fn file_only_filters_reject_directory_rules() {
        let err = compile_filter(&spec("extension", r#"extensions = "pdf""#), Targets::Dirs)
            .unwrap_err();
        assert!(matches!(err, ConfigError::TargetsMismatch { .. }));
        compile_filter(&spec("extension", r#"extensions = "pdf""#), Targets::Both).unwrap();
    }

    #[test]
    fn terminal_actions_must_come_last() {
        assert!(compile_action(&spec("delete", ""), false).is_err());
        assert!(compile_action(&spec("trash", ""), false).is_err());
        assert!(compile_action(&spec("delete", ""), true).is_ok());
    }

    #[test]
    fn negated_actions_are_rejected() {
        let mut s = spec("echo", r#"message = "m""#);
        s.not = true;
        assert!(compile_action(&s, true).is_err());
    }
}
