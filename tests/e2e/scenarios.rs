use std::path::Path;

use pkgup::{ManifestError, Options, ReadError, Url};

use super::harness::{TestContext, expect_eq, write_file};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "nearest_manifest_above_start",
            run: scenario_nearest_manifest,
        },
        Scenario {
            name: "manifest_in_start_directory",
            run: scenario_manifest_in_start,
        },
        Scenario {
            name: "no_manifest_in_tree",
            run: scenario_no_manifest,
        },
        Scenario {
            name: "filesystem_root_start",
            run: scenario_filesystem_root,
        },
        Scenario {
            name: "corrupt_manifest",
            run: scenario_corrupt_manifest,
        },
        Scenario {
            name: "invalid_version_normalized_only",
            run: scenario_invalid_version,
        },
        Scenario {
            name: "raw_and_normalized",
            run: scenario_raw_and_normalized,
        },
        Scenario {
            name: "file_url_start",
            run: scenario_file_url_start,
        },
        Scenario {
            name: "non_file_url_start",
            run: scenario_non_file_url_start,
        },
        Scenario {
            name: "stop_at_boundary",
            run: scenario_stop_at_boundary,
        },
        Scenario {
            name: "directory_named_package_json",
            run: scenario_directory_named_package_json,
        },
        Scenario {
            name: "concurrent_searches",
            run: scenario_concurrent_searches,
        },
    ]
}

fn scenario_nearest_manifest(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("nearest")?;
    env.manifest("a", r#"{"name":"outer","version":"2.0.0"}"#)?;
    let expected = env.manifest("a/b", r#"{"name":"x","version":"1.0.0"}"#)?;
    let start = env.dir("a/b/c")?;

    let found = ctx
        .read_both(Options::new().cwd(start))?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;

    expect_eq("path", found.path, expected)?;
    expect_eq("name", found.package_json.name.as_str(), "x")?;
    expect_eq("version", found.package_json.version.as_str(), "1.0.0")?;
    Ok(())
}

fn scenario_manifest_in_start(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("in-start")?;
    let expected = env.manifest("pkg", r#"{"name":"here"}"#)?;

    let found = ctx
        .read_both(Options::new().cwd(env.path("pkg")).raw())?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;

    expect_eq("path", found.path, expected)?;
    expect_eq("name", found.package_json.name(), Some("here"))?;
    Ok(())
}

fn scenario_no_manifest(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("none")?;
    let start = env.dir("a/b/c")?;

    let result = ctx
        .read_both(Options::new().cwd(start).stop_at(env.root.as_path()))?
        .map_err(|e| format!("Expected success: {}", e))?;
    if result.is_some() {
        return Err(format!("Expected no manifest, got {:?}", result));
    }
    Ok(())
}

fn scenario_filesystem_root(ctx: &TestContext) -> Result<(), String> {
    let root = Path::new("/");
    let result = ctx
        .read_both(Options::new().cwd(root).raw())?
        .map_err(|e| format!("Expected success: {}", e))?;

    // Only the root itself can be checked from the root.
    let root_manifest = root.join(pkgup::MANIFEST_FILE);
    match result {
        None if !root_manifest.is_file() => Ok(()),
        Some(found) if found.path == root_manifest => Ok(()),
        other => Err(format!("Unexpected result from root: {:?}", other)),
    }
}

fn scenario_corrupt_manifest(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("corrupt")?;
    env.manifest("", r#"{"name": "x", "version": "1.0"#)?;
    let start = env.dir("src")?;

    for outcome in [
        ctx.read_both(Options::new().cwd(start.as_path()).raw())?
            .map(|found| found.is_some()),
        ctx.read_both(Options::new().cwd(start.as_path()))?
            .map(|found| found.is_some()),
    ] {
        match outcome {
            Err(ReadError::Manifest {
                source: ManifestError::Syntax(_),
                ..
            }) => {}
            other => return Err(format!("Expected a syntax error, got {:?}", other)),
        }
    }
    Ok(())
}

fn scenario_invalid_version(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("bad-version")?;
    env.manifest("", r#"{"name":"x","version":"latest"}"#)?;

    let raw = ctx
        .read_both(Options::new().cwd(env.root.as_path()).raw())?
        .map_err(|e| format!("Raw read should not validate: {}", e))?
        .ok_or("Expected a manifest")?;
    expect_eq("raw version", raw.package_json.version(), Some("latest"))?;

    match ctx.read_both(Options::new().cwd(env.root.as_path()))? {
        Err(ReadError::Manifest {
            source: ManifestError::InvalidVersion(version),
            ..
        }) => expect_eq("rejected version", version.as_str(), "latest"),
        other => Err(format!("Expected an invalid version error, got {:?}", other)),
    }
}

fn scenario_raw_and_normalized(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("modes")?;
    env.manifest(
        "",
        r#"{"name":" x ","version":"v1.0.0","repository":"owner/x","custom":[1,2]}"#,
    )?;

    let raw = ctx
        .read_both(Options::new().cwd(env.root.as_path()).raw())?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;
    expect_eq("raw name", raw.package_json.name(), Some(" x "))?;
    expect_eq("raw readme", raw.package_json.get("readme"), None)?;
    expect_eq(
        "raw repository",
        raw.package_json.get("repository").and_then(|v| v.as_str()),
        Some("owner/x"),
    )?;

    let normalized = ctx
        .read_both(Options::new().cwd(env.root.as_path()))?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;
    let package = normalized.package_json;
    expect_eq("name", package.name.as_str(), "x")?;
    expect_eq("version", package.version.as_str(), "1.0.0")?;
    expect_eq("id", package.id.as_str(), "x@1.0.0")?;
    expect_eq("readme", package.readme.as_str(), pkgup::manifest::MISSING_README)?;
    expect_eq(
        "homepage",
        package.homepage.as_deref(),
        Some("https://github.com/owner/x#readme"),
    )?;
    expect_eq(
        "custom",
        package.others.get("custom"),
        Some(&serde_json::json!([1, 2])),
    )?;
    expect_eq("same file", normalized.path, raw.path)?;
    Ok(())
}

fn scenario_file_url_start(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("url")?;
    let expected = env.manifest("pkg", r#"{"name":"by-url"}"#)?;
    let start = env.dir("pkg/lib")?;
    let url = Url::from_directory_path(&start)
        .map_err(|()| format!("Cannot build file URL for {}", start.display()))?;

    let found = ctx
        .read_both(Options::new().cwd(url))?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;
    expect_eq("path", found.path, expected)?;
    Ok(())
}

fn scenario_non_file_url_start(ctx: &TestContext) -> Result<(), String> {
    let url = Url::parse("https://example.com/project/").map_err(|e| e.to_string())?;
    match ctx.read_both(Options::new().cwd(url))? {
        Err(ReadError::InvalidUrl { .. }) => Ok(()),
        other => Err(format!("Expected an invalid URL error, got {:?}", other)),
    }
}

fn scenario_stop_at_boundary(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("stop-at")?;
    env.manifest("", r#"{"name":"outside"}"#)?;
    let start = env.dir("project/src")?;

    let bounded = ctx
        .read_both(Options::new().cwd(start.as_path()).stop_at(env.path("project")))?
        .map_err(|e| format!("Expected success: {}", e))?;
    if bounded.is_some() {
        return Err(format!("Expected the boundary to hide the manifest, got {:?}", bounded));
    }

    let unbounded = ctx
        .read_both(Options::new().cwd(start.as_path()).stop_at(env.root.as_path()))?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected the manifest at the boundary")?;
    expect_eq("name", unbounded.package_json.name.as_str(), "outside")?;
    Ok(())
}

fn scenario_directory_named_package_json(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("dir-named")?;
    let expected = env.manifest("", r#"{"name":"real"}"#)?;
    env.dir("nested/package.json")?;
    write_file(&env.path("nested/package.json/index.js"), "")?;

    let found = ctx
        .read_both(Options::new().cwd(env.path("nested")))?
        .map_err(|e| format!("Expected success: {}", e))?
        .ok_or("Expected a manifest")?;
    expect_eq("path", found.path, expected)?;
    Ok(())
}

fn scenario_concurrent_searches(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("concurrent")?;
    let mut starts = Vec::new();
    for i in 0..8 {
        let name = format!("pkg-{}", i);
        env.manifest(&name, &format!(r#"{{"name":"{}"}}"#, name))?;
        starts.push((name.clone(), env.dir(&format!("{}/deep/er", name))?));
    }

    let handles: Vec<_> = starts
        .into_iter()
        .map(|(name, start)| {
            ctx.runtime().spawn(async move {
                let found = pkgup::read_package_up(Options::new().cwd(start)).await;
                (name, found)
            })
        })
        .collect();

    for handle in handles {
        let (name, found) = ctx
            .block_on(handle)
            .map_err(|e| format!("Task failed: {}", e))?;
        let found = found
            .map_err(|e| format!("Expected success: {}", e))?
            .ok_or("Expected a manifest")?;
        expect_eq("name", found.package_json.name.as_str(), name.as_str())?;
    }
    Ok(())
}
