//! Named refs
//!
//! A ref is a small text file holding either a 40-hex digest or, for `HEAD`,
//! a symbolic pointer `ref: refs/heads/<name>`. Symbolic resolution follows
//! at most one level, because `HEAD` is the only symbolic ref.
//!
//! Updates go through write-temp-then-rename and support compare-and-swap:
//! when the expected old value no longer matches, the update fails with a
//! `RefRace` instead of clobbering someone else's movement.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::core::EngineError;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use rand;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Regex for symbolic ref content
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Ref storage rooted at the repository directory
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (`.spgit`)
    path: Box<Path>,
}

/// Content of a ref file
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(RefName),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_from(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let symref = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        match symref {
            Some(captures) => Ok(Some(SymRefOrOid::SymRef(RefName::new(
                captures[1].to_string(),
            )))),
            None => Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?))),
        }
    }
}

impl Refs {
    /// Read a ref down to a digest, following one symbolic level
    pub fn read(&self, name: &RefName) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_from(&self.ref_path(name))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(target)) => {
                match SymRefOrOid::read_from(&self.ref_path(&target))? {
                    Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
                    Some(SymRefOrOid::SymRef(next)) => Err(anyhow::anyhow!(
                        "nested symbolic ref {} -> {} -> {}",
                        name,
                        target,
                        next
                    )),
                    None => Ok(None),
                }
            }
            None => Ok(None),
        }
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read(&RefName::head())
    }

    /// The ref `HEAD` designates: a branch ref, or `HEAD` itself if detached
    pub fn current_ref(&self) -> anyhow::Result<RefName> {
        match SymRefOrOid::read_from(&self.ref_path(&RefName::head()))? {
            Some(SymRefOrOid::SymRef(target)) => Ok(target),
            Some(SymRefOrOid::Oid(_)) | None => Ok(RefName::head()),
        }
    }

    /// The checked-out branch, if `HEAD` is not detached
    pub fn current_branch(&self) -> anyhow::Result<Option<BranchName>> {
        Ok(self.current_ref()?.as_branch())
    }

    pub fn is_detached(&self) -> anyhow::Result<bool> {
        Ok(self.current_ref()?.is_head())
    }

    /// Point `HEAD` at a branch
    pub fn set_head_to_branch(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.ref_path(&RefName::head()),
            &format!("ref: refs/heads/{}\n", branch),
        )
    }

    /// Detach `HEAD` onto a digest
    pub fn set_head_detached(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.ref_path(&RefName::head()), &format!("{}\n", oid))
    }

    /// Atomically move a ref to a new digest
    ///
    /// With `expected_old` supplied, the update only goes through when the
    /// ref still holds that value. Updating `HEAD` while it points at a
    /// branch moves the branch, matching the symbolic indirection.
    pub fn update(
        &self,
        name: &RefName,
        expected_old: Option<&ObjectId>,
        new_oid: &ObjectId,
    ) -> anyhow::Result<()> {
        let target = if name.is_head() {
            self.current_ref()?
        } else {
            name.clone()
        };

        if let Some(expected) = expected_old {
            let found = self.read(&target)?;
            if found.as_ref() != Some(expected) {
                return Err(EngineError::RefRace {
                    name: target.to_string(),
                    expected: expected.to_string(),
                    found: found
                        .map(|oid| oid.to_string())
                        .unwrap_or_else(|| "nothing".to_string()),
                }
                .into());
            }
        }

        self.write_ref_file(&self.ref_path(&target), &format!("{}\n", new_oid))
    }

    /// Remove a ref file
    ///
    /// `HEAD` and the currently checked-out branch are protected; merge
    /// guards for branch deletion live with the caller, which has the graph.
    pub fn delete(&self, name: &RefName) -> anyhow::Result<ObjectId> {
        if name.is_head() {
            return Err(EngineError::user("refusing to delete HEAD"));
        }
        if self.current_ref()? == *name {
            return Err(EngineError::user(format!(
                "cannot delete '{}': checked out",
                name.short_name()
            )));
        }

        let path = self.ref_path(name);
        match self.read(name)? {
            Some(oid) => {
                std::fs::remove_file(&path)
                    .with_context(|| format!("failed to delete ref file at {:?}", path))?;
                self.prune_empty_parent_dirs(&path)?;
                Ok(oid)
            }
            None => Err(EngineError::user(format!(
                "ref '{}' does not exist",
                name.short_name()
            ))),
        }
    }

    /// Enumerate refs under a prefix such as `refs/heads` or `refs/tags`
    pub fn list(&self, prefix: &str) -> anyhow::Result<Vec<RefName>> {
        let root = self.path.join(prefix);
        if !root.exists() {
            return Ok(Vec::new());
        }

        let mut refs: Vec<RefName> = WalkDir::new(&root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(self.path.as_ref()).ok()?;
                Some(RefName::new(relative.to_string_lossy().to_string()))
            })
            .collect();

        refs.sort();
        Ok(refs)
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<RefName>> {
        self.list("refs/heads")
    }

    pub fn list_tags(&self) -> anyhow::Result<Vec<RefName>> {
        self.list("refs/tags")
    }

    /// Map each digest to the refs pointing at it, for log decoration
    pub fn reverse_refs(&self) -> anyhow::Result<HashMap<ObjectId, Vec<RefName>>> {
        let mut all = self.list("refs")?;
        all.push(RefName::head());

        Ok(all.into_iter().fold(HashMap::new(), |mut acc, name| {
            if let Ok(Some(oid)) = self.read(&name) {
                acc.entry(oid).or_default().push(name);
            }
            acc
        }))
    }

    pub fn ref_path(&self, name: &RefName) -> std::path::PathBuf {
        self.path.join(name.to_path())
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("ref file {:?} has no parent directory", path))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create ref directories for {:?}", path))?;

        let temp_path = parent.join(format!("tmp-ref-{}", rand::random::<u32>()));
        std::fs::write(&temp_path, content)
            .with_context(|| format!("failed to write ref file at {:?}", temp_path))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("failed to move ref file into place at {:?}", path))?;

        Ok(())
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        let stop = self.path.join("refs");
        let mut parent = path.parent();

        while let Some(dir) = parent {
            if dir == stop.as_path() || dir == self.path.as_ref() {
                break;
            }
            if dir.read_dir()?.next().is_some() {
                break;
            }
            std::fs::remove_dir(dir)
                .with_context(|| format!("failed to remove empty ref directory at {:?}", dir))?;
            parent = dir.parent();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn refs() -> (TempDir, Refs) {
        let dir = TempDir::new().unwrap();
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());
        (dir, refs)
    }

    fn oid(seed: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}", seed).repeat(20)).unwrap()
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    #[rstest]
    fn absent_refs_read_as_none(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        assert_eq!(refs.read(&RefName::branch(&branch("main"))).unwrap(), None);
        assert_eq!(refs.read_head().unwrap(), None);
    }

    #[rstest]
    fn head_follows_its_branch(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = branch("main");

        refs.set_head_to_branch(&main).unwrap();
        assert_eq!(refs.current_branch().unwrap(), Some(main.clone()));
        assert_eq!(refs.read_head().unwrap(), None, "unborn branch");

        refs.update(&RefName::branch(&main), None, &oid(1)).unwrap();
        assert_eq!(refs.read_head().unwrap(), Some(oid(1)));
    }

    #[rstest]
    fn updating_head_moves_the_checked_out_branch(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = branch("main");
        refs.set_head_to_branch(&main).unwrap();
        refs.update(&RefName::branch(&main), None, &oid(1)).unwrap();

        refs.update(&RefName::head(), Some(&oid(1)), &oid(2)).unwrap();
        assert_eq!(refs.read(&RefName::branch(&main)).unwrap(), Some(oid(2)));
    }

    #[rstest]
    fn detached_head_reads_back_its_digest(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        refs.set_head_detached(&oid(7)).unwrap();

        assert!(refs.is_detached().unwrap());
        assert_eq!(refs.read_head().unwrap(), Some(oid(7)));
        assert_eq!(refs.current_branch().unwrap(), None);
    }

    #[rstest]
    fn compare_and_swap_rejects_stale_expectations(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        let name = RefName::branch(&branch("main"));
        refs.update(&name, None, &oid(1)).unwrap();

        let err = refs.update(&name, Some(&oid(9)), &oid(2)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::RefRace { .. })
        ));
        assert_eq!(refs.read(&name).unwrap(), Some(oid(1)), "value untouched");

        refs.update(&name, Some(&oid(1)), &oid(2)).unwrap();
        assert_eq!(refs.read(&name).unwrap(), Some(oid(2)));
    }

    #[rstest]
    fn deleting_head_or_the_current_branch_is_refused(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = branch("main");
        refs.set_head_to_branch(&main).unwrap();
        refs.update(&RefName::branch(&main), None, &oid(1)).unwrap();

        assert!(refs.delete(&RefName::head()).is_err());
        assert!(refs.delete(&RefName::branch(&main)).is_err());
    }

    #[rstest]
    fn deleting_another_branch_prunes_empty_directories(refs: (TempDir, Refs)) {
        let (dir, refs) = refs;
        let main = branch("main");
        let feature = branch("feature/deep/nested");
        refs.set_head_to_branch(&main).unwrap();
        refs.update(&RefName::branch(&feature), None, &oid(3)).unwrap();

        let deleted = refs.delete(&RefName::branch(&feature)).unwrap();
        assert_eq!(deleted, oid(3));
        assert!(!dir.path().join("refs/heads/feature").exists());
        assert!(dir.path().join("refs/heads").exists());
    }

    #[rstest]
    fn listing_and_reverse_refs_cover_heads_and_tags(refs: (TempDir, Refs)) {
        let (_dir, refs) = refs;
        let main = branch("main");
        refs.set_head_to_branch(&main).unwrap();
        refs.update(&RefName::branch(&main), None, &oid(1)).unwrap();
        refs.update(&RefName::tag("v1"), None, &oid(1)).unwrap();
        refs.update(&RefName::branch(&branch("feature")), None, &oid(2))
            .unwrap();

        let branches = refs.list_branches().unwrap();
        assert_eq!(
            branches,
            vec![
                RefName::branch(&branch("feature")),
                RefName::branch(&main)
            ]
        );

        let reverse = refs.reverse_refs().unwrap();
        let mut at_one = reverse.get(&oid(1)).unwrap().clone();
        at_one.sort();
        assert_eq!(
            at_one,
            vec![
                RefName::head(),
                RefName::branch(&main),
                RefName::tag("v1")
            ]
        );
    }
}
