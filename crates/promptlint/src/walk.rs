use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use ignore::WalkBuilder;

/// How [`walk_files`] treats hidden entries, ignore files and symlinks.
#[derive(Clone, Copy, Debug, Default)]
pub struct WalkOptions {
    /// Include hidden files and directories (those starting with `.`).
    pub hidden: bool,
    /// Disable `.gitignore`, `.ignore` and the other ignore files.
    pub no_ignore: bool,
    /// Follow symbolic links.
    pub follow_links: bool,
}

/// Files under `roots` that pass `predicate`, sorted and deduplicated.
///
/// A root that is a file is taken as is, whatever its name. Directories are
/// walked with the `ignore` crate's standard filters.
pub fn walk_files(
    roots: &[Utf8PathBuf],
    predicate: impl Fn(&Utf8Path) -> bool,
    options: WalkOptions,
) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }

        if !root.is_dir() {
            anyhow::bail!("No such file or directory: {root}");
        }

        let mut builder = WalkBuilder::new(root.as_std_path());
        // standard_filters first, it resets `hidden`
        builder
            .standard_filters(!options.no_ignore)
            .hidden(!options.hidden)
            .follow_links(options.follow_links);

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%root, "skipping entry: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
                continue;
            }
            let Some(path) = Utf8Path::from_path(entry.path()) else {
                tracing::debug!(path = %entry.path().display(), "skipping non-UTF-8 path");
                continue;
            };
            if predicate(path) {
                files.push(path.to_owned());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}
