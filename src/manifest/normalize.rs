//! Normalization of decoded `package.json` data
//!
//! Fixes up the well-known fields the way npm tooling expects them:
//! - `name` trimmed and validated, `version` cleaned to strict semver
//! - string shorthands (`repository`, `bugs`, `bin`, `man`, `keywords`,
//!   people) expanded to their object/array forms
//! - defaults for `readme`, `description`, `bugs` and `homepage`
//! - dependency maps coerced to `name -> range` objects
//!
//! Malformed optional fields are dropped with a warning. An unusable `name` or
//! `version` is an error.

use super::package_json::{Bugs, NormalizedPackageJson, Person, Repository};
use crate::error::ManifestError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

/// Placeholder used when the manifest carries no readme
pub const MISSING_README: &str = "ERROR: No README data found!";

pub(crate) fn normalize(mut data: Map<String, Value>) -> Result<NormalizedPackageJson, ManifestError> {
    let name = fix_name(data.shift_remove("name"))?;
    let version = fix_version(data.shift_remove("version"))?;

    let mut description = match data.shift_remove("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            warn!(field = "description", "description field should be a string; dropping it");
            None
        }
    };

    let repository = fix_repository(data.shift_remove("repository"));
    let scripts = data.shift_remove("scripts").and_then(fix_scripts);
    let files = data
        .shift_remove("files")
        .and_then(|value| string_list("files", value, false));
    let bin = data.shift_remove("bin").and_then(|value| fix_bin(&name, value));
    let man = data
        .shift_remove("man")
        .and_then(|value| string_list("man", value, true));
    let bugs = data
        .shift_remove("bugs")
        .and_then(fix_bugs)
        .or_else(|| derive_bugs(repository.as_ref()));
    let keywords = data.shift_remove("keywords").and_then(fix_keywords);

    let readme = match data.shift_remove("readme") {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Null) | Some(Value::String(_)) | None => MISSING_README.to_string(),
        Some(_) => {
            warn!(field = "readme", "readme field should be a string; replacing it");
            MISSING_README.to_string()
        }
    };
    if description.is_none() {
        description = extract_description(&readme);
    }

    let homepage = fix_homepage(data.shift_remove("homepage"))
        .or_else(|| derive_homepage(repository.as_ref()));

    if !data.contains_key("license") && !data.contains_key("licenses") {
        warn!(field = "license", "no license field");
    }

    let mut dependencies = data
        .shift_remove("dependencies")
        .and_then(|value| fix_dependencies("dependencies", value));
    let dev_dependencies = data
        .shift_remove("devDependencies")
        .and_then(|value| fix_dependencies("devDependencies", value));
    let optional_dependencies = data
        .shift_remove("optionalDependencies")
        .and_then(|value| fix_dependencies("optionalDependencies", value));
    if let Some(optional) = &optional_dependencies {
        let deps = dependencies.get_or_insert_with(IndexMap::new);
        for (dep, range) in optional {
            deps.insert(dep.clone(), range.clone());
        }
    }

    let author = data.shift_remove("author").and_then(|value| person("author", value));
    let contributors = data
        .shift_remove("contributors")
        .and_then(|value| people("contributors", value));
    let maintainers = data
        .shift_remove("maintainers")
        .and_then(|value| people("maintainers", value));

    // Always recomputed from name and version.
    data.shift_remove("_id");
    let id = format!("{}@{}", name, version);

    Ok(NormalizedPackageJson {
        name,
        version,
        description,
        readme,
        id,
        repository,
        bugs,
        homepage,
        keywords,
        scripts,
        files,
        bin,
        man,
        author,
        contributors,
        maintainers,
        dependencies,
        dev_dependencies,
        optional_dependencies,
        others: data,
    })
}

// === name / version ===

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn fix_name(value: Option<Value>) -> Result<String, ManifestError> {
    let value = match value {
        Some(value) if !is_falsy(&value) => value,
        _ => return Ok(String::new()),
    };
    let Value::String(name) = value else {
        return Err(ManifestError::NameNotString);
    };

    let name = name.trim().to_string();
    if !is_valid_name(&name) {
        return Err(ManifestError::InvalidName(name));
    }
    Ok(name)
}

fn is_valid_name(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    let lower = name.to_lowercase();
    if lower == "node_modules" || lower == "favicon.ico" {
        return false;
    }
    is_valid_scoped_name(name) || is_url_safe(name)
}

/// `@scope/pkg` where both halves are URL-safe and non-empty
fn is_valid_scoped_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix('@') else {
        return false;
    };
    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        [scope, package] => {
            !scope.is_empty() && !package.is_empty() && is_url_safe(scope) && is_url_safe(package)
        }
        _ => false,
    }
}

/// True if percent-encoding a URI component would leave `s` unchanged.
fn is_url_safe(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

fn fix_version(value: Option<Value>) -> Result<String, ManifestError> {
    let value = match value {
        Some(value) if !is_falsy(&value) => value,
        _ => return Ok(String::new()),
    };
    match value {
        Value::String(raw) => clean_version(&raw).ok_or(ManifestError::InvalidVersion(raw)),
        other => Err(ManifestError::InvalidVersion(other.to_string())),
    }
}

/// Accepts surrounding whitespace and leading `=`/`v`, like a loose semver parser.
/// Build metadata is dropped.
pub(crate) fn clean_version(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches(|c: char| c == '=' || c == 'v' || c.is_whitespace());
    let version = semver::Version::parse(trimmed).ok()?;
    let version = semver::Version {
        build: semver::BuildMetadata::EMPTY,
        ..version
    };
    Some(version.to_string())
}

// === repository / bugs / homepage ===

fn fix_repository(value: Option<Value>) -> Option<Repository> {
    match value? {
        Value::Null => None,
        Value::String(url) => Some(Repository {
            kind: Some("git".to_string()),
            url: Some(expand_shorthand(&url)),
            directory: None,
        }),
        Value::Object(obj) => Some(Repository {
            kind: string_field(&obj, "type"),
            url: string_field(&obj, "url").map(|url| expand_shorthand(&url)),
            directory: string_field(&obj, "directory"),
        }),
        _ => {
            warn!(field = "repository", "repository field should be a string or object; dropping it");
            None
        }
    }
}

/// `owner/repo` or `github:owner/repo` to a full git URL; anything else is kept.
fn expand_shorthand(url: &str) -> String {
    let (spec, committish) = match url.split_once('#') {
        Some((spec, committish)) => (spec, Some(committish)),
        None => (url, None),
    };
    let spec = spec.strip_prefix("github:").unwrap_or(spec);
    let Some((owner, repo)) = split_shorthand(spec) else {
        return url.to_string();
    };
    let mut expanded = format!("git+https://github.com/{}/{}.git", owner, repo);
    if let Some(committish) = committish {
        expanded.push('#');
        expanded.push_str(committish);
    }
    expanded
}

fn split_shorthand(spec: &str) -> Option<(&str, &str)> {
    if spec.contains(':') || spec.starts_with('@') {
        return None;
    }
    let (owner, repo) = spec.split_once('/')?;
    let valid = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    (valid(owner) && valid(repo)).then_some((owner, repo))
}

/// Owner and repository name for a GitHub-hosted repository URL.
fn github_slug(repository: Option<&Repository>) -> Option<(String, String)> {
    let url = repository?.url.as_deref()?;
    let url = url.split('#').next().unwrap_or(url);
    let (_, path) = url
        .split_once("github.com/")
        .or_else(|| url.split_once("github.com:"))?;
    let mut parts = path.trim_end_matches('/').splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some((owner.to_string(), repo.to_string()))
}

fn fix_bugs(value: Value) -> Option<Bugs> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if looks_like_email(&s) {
                Some(Bugs {
                    url: None,
                    email: Some(s),
                })
            } else {
                Some(Bugs {
                    url: Some(s),
                    email: None,
                })
            }
        }
        Value::Object(obj) => {
            let bugs = Bugs {
                url: string_field(&obj, "url"),
                email: string_field(&obj, "email"),
            };
            if bugs.url.is_none() && bugs.email.is_none() {
                warn!(field = "bugs", "bugs object has neither url nor email; dropping it");
                return None;
            }
            Some(bugs)
        }
        _ => {
            warn!(field = "bugs", "bugs field should be a string or object; dropping it");
            None
        }
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((user, host)) => {
            !user.is_empty() && host.contains('.') && !s.contains('/') && !s.contains(' ')
        }
        None => false,
    }
}

fn derive_bugs(repository: Option<&Repository>) -> Option<Bugs> {
    let (owner, repo) = github_slug(repository)?;
    Some(Bugs {
        url: Some(format!("https://github.com/{}/{}/issues", owner, repo)),
        email: None,
    })
}

fn fix_homepage(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => {
            if s.contains("://") {
                Some(s)
            } else {
                Some(format!("http://{}", s))
            }
        }
        _ => {
            warn!(field = "homepage", "homepage field should be a string; dropping it");
            None
        }
    }
}

fn derive_homepage(repository: Option<&Repository>) -> Option<String> {
    let (owner, repo) = github_slug(repository)?;
    Some(format!("https://github.com/{}/{}#readme", owner, repo))
}

// === lists and maps ===

fn fix_scripts(value: Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::Object(obj) => Some(string_map("scripts", obj)),
        Value::Null => None,
        _ => {
            warn!(field = "scripts", "scripts field should be an object; dropping it");
            None
        }
    }
}

fn fix_bin(name: &str, value: Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::String(path) => {
            let command = match name.strip_prefix('@') {
                Some(scoped) => scoped.split_once('/').map_or(name, |(_, unscoped)| unscoped),
                None => name,
            };
            Some(IndexMap::from([(command.to_string(), path)]))
        }
        Value::Object(obj) => Some(string_map("bin", obj)),
        Value::Null => None,
        _ => {
            warn!(field = "bin", "bin field should be a string or object; dropping it");
            None
        }
    }
}

fn fix_keywords(value: Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        other => string_list("keywords", other, false),
    }
}

/// Keep the string entries of an array; optionally wrap a lone string.
fn string_list(field: &str, value: Value, wrap_string: bool) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) if wrap_string => Some(vec![s]),
        Value::Null => None,
        _ => {
            warn!(field, "field should be an array of strings; dropping it");
            None
        }
    }
}

/// Keep the string values of an object, warning about the rest.
fn string_map(field: &str, obj: Map<String, Value>) -> IndexMap<String, String> {
    obj.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            _ => {
                warn!(field, entry = %key, "non-string entry; dropping it");
                None
            }
        })
        .collect()
}

fn fix_dependencies(field: &str, value: Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::Object(obj) => Some(string_map(field, obj)),
        Value::Array(items) => Some(objectify_dependencies(
            items.iter().filter_map(Value::as_str),
        )),
        Value::String(s) => Some(objectify_dependencies(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|d| !d.is_empty()),
        )),
        Value::Null => None,
        _ => {
            warn!(field, "dependency field should be an object; dropping it");
            None
        }
    }
}

/// `["a@^1", "@s/b@2", "c"]` to `{a: "^1", "@s/b": "2", c: ""}`
fn objectify_dependencies<'a>(specs: impl Iterator<Item = &'a str>) -> IndexMap<String, String> {
    specs
        .map(|spec| {
            let spec = spec.trim();
            let search_from = usize::from(spec.starts_with('@'));
            match spec[search_from..].find('@') {
                Some(at) => {
                    let at = at + search_from;
                    (spec[..at].to_string(), spec[at + 1..].trim().to_string())
                }
                None => (spec.to_string(), String::new()),
            }
        })
        .collect()
}

// === people ===

fn person(field: &str, value: Value) -> Option<Person> {
    match value {
        Value::String(s) => Some(parse_person(&s)),
        Value::Object(obj) => Some(Person {
            name: string_field(&obj, "name"),
            email: string_field(&obj, "email"),
            url: string_field(&obj, "url").or_else(|| string_field(&obj, "web")),
        }),
        Value::Null => None,
        _ => {
            warn!(field, "person should be a string or object; dropping it");
            None
        }
    }
}

fn people(field: &str, value: Value) -> Option<Vec<Person>> {
    match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| person(field, item))
                .collect(),
        ),
        Value::Null => None,
        _ => {
            warn!(field, "field should be an array; dropping it");
            None
        }
    }
}

/// `Name <email> (url)`, each part optional
pub(crate) fn parse_person(s: &str) -> Person {
    let name_end = s.find(['(', '<']).unwrap_or(s.len());
    let name = s[..name_end].trim();
    Person {
        name: (!name.is_empty()).then(|| name.to_string()),
        email: delimited(s, '<', '>'),
        url: delimited(s, '(', ')'),
    }
}

fn delimited(s: &str, open: char, close: char) -> Option<String> {
    let start = s.find(open)? + open.len_utf8();
    let len = s[start..].find(close)?;
    let inner = &s[start..start + len];
    (!inner.is_empty() && !inner.contains(open)).then(|| inner.to_string())
}

// === helpers ===

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// First paragraph of a readme that is not a heading, lines joined with spaces.
pub(crate) fn extract_description(readme: &str) -> Option<String> {
    if readme.is_empty() || readme == MISSING_README {
        return None;
    }
    let lines: Vec<&str> = readme.trim().split('\n').collect();
    let start = lines
        .iter()
        .position(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| line.trim().is_empty())
        .map_or(lines.len(), |offset| start + 1 + offset);
    let description = lines[start..end].join(" ").trim().to_string();
    (!description.is_empty()).then_some(description)
}
