// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Parley-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Parley and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceMetaJson {
    format_version: u32,
    workspace_id: String,
    #[serde(default)]
    rev: u64,
    #[serde(default)]
    guides: Vec<WorkspaceMetaGuideJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceMetaGuideJson {
    guide_id: String,
    path: String,
}

fn workspace_meta_to_json(
    workspace_dir: &Path,
    meta: &WorkspaceMeta,
) -> Result<WorkspaceMetaJson, StoreError> {
    let guides = meta
        .guides
        .iter()
        .map(|guide| {
            let relative = to_relative_path(workspace_dir, &guide.path, "guides.path")?;
            Ok(WorkspaceMetaGuideJson {
                guide_id: guide.guide_id.to_string(),
                path: relative.to_string_lossy().replace('\\', "/"),
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    Ok(WorkspaceMetaJson {
        format_version: FORMAT_VERSION,
        workspace_id: meta.workspace_id.to_string(),
        rev: meta.rev,
        guides,
    })
}

fn workspace_meta_from_json(
    workspace_dir: &Path,
    meta_path: &Path,
    meta_json: WorkspaceMetaJson,
) -> Result<WorkspaceMeta, StoreError> {
    if meta_json.format_version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedFormat {
            path: meta_path.to_path_buf(),
            version: meta_json.format_version,
        });
    }

    let workspace_id = WorkspaceId::new(meta_json.workspace_id.clone()).map_err(|source| {
        StoreError::InvalidId { field: "workspace_id", value: meta_json.workspace_id, source }
    })?;

    let mut seen = BTreeSet::new();
    let mut guides = Vec::with_capacity(meta_json.guides.len());
    for guide in meta_json.guides {
        let guide_id = GuideId::new(guide.guide_id.clone()).map_err(|source| StoreError::InvalidId {
            field: "guides.guide_id",
            value: guide.guide_id.clone(),
            source,
        })?;
        if !seen.insert(guide_id.clone()) {
            return Err(StoreError::DuplicateRecord {
                path: meta_path.to_path_buf(),
                record: guide_id.to_string(),
            });
        }
        let relative = PathBuf::from(&guide.path);
        validate_relative_path("guides.path", &relative)?;
        guides.push(WorkspaceMetaGuide { guide_id, path: workspace_dir.join(relative) });
    }

    Ok(WorkspaceMeta { workspace_id, rev: meta_json.rev, guides })
}

fn validate_relative_path(field: &'static str, path: &Path) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidRelativePath { field, value: path.to_path_buf() };
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Err(invalid());
    }

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => return Err(invalid()),
            Component::CurDir | Component::Normal(_) => {}
        }
    }

    Ok(())
}

fn to_relative_path(
    workspace_dir: &Path,
    path: &Path,
    field: &'static str,
) -> Result<PathBuf, StoreError> {
    let relative = if path.is_absolute() {
        path.strip_prefix(workspace_dir).map(PathBuf::from).map_err(|_| {
            StoreError::PathOutsideWorkspace {
                workspace_dir: workspace_dir.to_path_buf(),
                path: path.to_path_buf(),
            }
        })?
    } else {
        path.strip_prefix(workspace_dir).map(PathBuf::from).unwrap_or_else(|_| path.to_path_buf())
    };

    validate_relative_path(field, &relative)?;
    Ok(relative)
}

fn create_dir_all_safe(workspace_dir: &Path, relative: &Path) -> Result<(), StoreError> {
    if relative.as_os_str().is_empty() {
        return Ok(());
    }

    validate_relative_path("dir", relative)?;

    let mut current = workspace_dir.to_path_buf();
    for component in relative.components() {
        let Component::Normal(part) = component else {
            continue;
        };

        current.push(part);

        match fs::symlink_metadata(&current) {
            Ok(md) => {
                if md.file_type().is_symlink() {
                    return Err(StoreError::SymlinkRefused { path: current });
                }
                if !md.is_dir() {
                    return Err(StoreError::io(
                        current,
                        io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                    ));
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir(&current).map_err(|source| StoreError::io(&current, source))?;
            }
            Err(source) => return Err(StoreError::io(current, source)),
        }
    }

    Ok(())
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

/// Writes `contents` to `path` (inside `workspace_dir`) via a temp file and atomic rename.
fn write_atomic_in_workspace(
    workspace_dir: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(workspace_dir).map_err(|source| StoreError::io(workspace_dir, source))?;

    let relative = to_relative_path(workspace_dir, path, "path")?;
    let parent_rel = relative.parent().unwrap_or_else(|| Path::new(""));
    create_dir_all_safe(workspace_dir, parent_rel)?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused { path: path.to_path_buf() });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(StoreError::io(path, source)),
    }

    let Some(parent) = path.parent() else {
        return Err(StoreError::io(path, io::Error::other("path has no parent")));
    };
    let Some(file_name) = path.file_name() else {
        return Err(StoreError::io(path, io::Error::other("path has no file name")));
    };

    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
    let tmp_path = parent.join(format!(".parley.tmp.{}.{}", file_name.to_string_lossy(), nanos));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::io(&tmp_path, source))?;

    file.write_all(contents).map_err(|source| StoreError::io(&tmp_path, source))?;

    if durability == WriteDurability::Durable {
        file.sync_all().map_err(|source| StoreError::io(&tmp_path, source))?;
    }
    drop(file);

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::io(path, source));
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(parent).map_err(|source| StoreError::io(parent, source))?;
            dir.sync_all().map_err(|source| StoreError::io(parent, source))?;
        }
    }

    Ok(())
}
