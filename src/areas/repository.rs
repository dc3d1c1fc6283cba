//! Repository handle
//!
//! `Repository` wires the storage subsystems together: object database,
//! staging index, refs, reflogs and configuration, plus the writer all
//! porcelain output goes through. The high-level operations live in
//! `commands::porcelain`, one file per operation, each as an
//! `impl Repository` block over this handle.
//!
//! Every ref mutation funnels through `update_ref_with_log`, which enforces
//! the ordering objects → ref → reflog: a crash can strand an unreachable
//! object or lose a reflog line, but a ref can never point at bytes that
//! were not persisted first.

use crate::areas::catalog::{FileCatalog, RemoteList};
use crate::areas::config::Config;
use crate::areas::database::{CommitCache, Database};
use crate::areas::index::Index;
use crate::areas::reflog::{Reflog, ReflogEntry};
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::ref_name::RefName;
use crate::artifacts::core::EngineError;
use crate::artifacts::history::HistoryWalker;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Tree;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// Repository directory name
pub const SPGIT_DIR: &str = ".spgit";

/// Object database directory name
const DATABASE_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

/// Config file name
const CONFIG_FILE: &str = "config";

/// Reflog directory name
const LOGS_DIR: &str = "logs";

pub struct Repository {
    /// Working directory root (the directory holding `.spgit`)
    path: Box<Path>,
    /// Output writer (stdout, or a capture buffer in tests)
    writer: RefCell<Box<dyn std::io::Write>>,
    /// Object database
    database: Database,
    /// Staging area
    index: RefCell<Index>,
    /// Ref storage
    refs: Refs,
    /// Reflog storage
    reflog: Reflog,
    /// Explicit configuration value
    config: RefCell<Config>,
}

impl Repository {
    /// Open a repository at exactly this path, without existence checks
    ///
    /// `init` and `clone` use this; everything else goes through `discover`.
    pub fn at(path: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let spgit_dir = path.join(SPGIT_DIR);

        let database = Database::new(spgit_dir.join(DATABASE_DIR).into_boxed_path());
        let index = Index::new(spgit_dir.join(INDEX_FILE).into_boxed_path());
        let refs = Refs::new(spgit_dir.clone().into_boxed_path());
        let reflog = Reflog::new(spgit_dir.join(LOGS_DIR).into_boxed_path());
        let config = Config::load_with_global(&spgit_dir.join(CONFIG_FILE))?;

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            index: RefCell::new(index),
            refs,
            reflog,
            config: RefCell::new(config),
        })
    }

    /// Walk upward from `start` until a `.spgit` directory appears
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            if dir.join(SPGIT_DIR).is_dir() {
                let mut repository = Self::at(dir, writer)?;
                repository.index.get_mut().rehydrate()?;
                return Ok(repository);
            }
            current = dir.parent().map(Path::to_path_buf);
        }

        Err(EngineError::NotARepository(start.to_path_buf()).into())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spgit_dir(&self) -> PathBuf {
        self.path.join(SPGIT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.spgit_dir().join(CONFIG_FILE)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn reflog(&self) -> &Reflog {
        &self.reflog
    }

    pub fn config(&'_ self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.borrow().save(&self.config_path())
    }

    /// The catalog serving a configured remote, with its list id
    pub fn catalog_for(&self, remote: &str) -> anyhow::Result<(Box<dyn RemoteList>, String)> {
        let url = self
            .config
            .borrow()
            .remote_url(remote)
            .map(str::to_string)
            .ok_or_else(|| EngineError::user(format!("remote '{}' not found", remote)))?;

        let catalog = FileCatalog::new();
        let list_id = catalog.resolve_url(&url)?;
        Ok((Box::new(catalog), list_id))
    }

    /// The list id `add .` reconciles against
    ///
    /// `playlist.id` wins; otherwise the `origin` remote is resolved.
    pub fn working_list_id(&self) -> anyhow::Result<String> {
        if let Some(id) = self.config.borrow().playlist.id.clone() {
            return Ok(id);
        }

        let (_, list_id) = self.catalog_for("origin").map_err(|_| {
            EngineError::user(
                "no playlist configured; set playlist.id or add an 'origin' remote",
            )
        })?;
        Ok(list_id)
    }

    /// The branch HEAD points at, or a user error when detached
    pub fn require_current_branch(&self) -> anyhow::Result<BranchName> {
        self.refs
            .current_branch()?
            .ok_or_else(|| EngineError::user("HEAD is detached"))
    }

    pub fn head_commit(&self) -> anyhow::Result<Option<(ObjectId, Commit)>> {
        match self.refs.read_head()? {
            Some(oid) => {
                let commit = self
                    .database
                    .parse_commit(&oid)?
                    .ok_or_else(|| anyhow::anyhow!("HEAD object {} is not a commit", oid))?;
                Ok(Some((oid, commit)))
            }
            None => Ok(None),
        }
    }

    /// HEAD's tree, or the empty tree before the first commit
    pub fn head_tree(&self) -> anyhow::Result<Tree> {
        match self.head_commit()? {
            Some((_, commit)) => self.tree_of(&commit),
            None => Ok(Tree::default()),
        }
    }

    pub fn tree_of(&self, commit: &Commit) -> anyhow::Result<Tree> {
        self.database
            .parse_tree(commit.tree_oid())?
            .ok_or_else(|| anyhow::anyhow!("commit tree {} is not a tree", commit.tree_oid()))
    }

    /// Commit loader for graph algorithms, backed by a fresh commit cache
    ///
    /// Each loader parses any given commit at most once, however often the
    /// traversal revisits it.
    pub fn commit_loader(
        &self,
    ) -> impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_ {
        let cache = RefCell::new(CommitCache::new());
        move |oid: &ObjectId| cache.borrow_mut().get_or_load(&self.database, oid)
    }

    /// Graph walker over this repository's commits
    pub fn history(
        &self,
    ) -> HistoryWalker<impl Fn(&ObjectId) -> anyhow::Result<SlimCommit> + '_> {
        HistoryWalker::new(self.commit_loader())
    }

    /// Atomically move a ref and record the movement
    ///
    /// Objects the new digest depends on must already be stored. The reflog
    /// line lands after the ref file; when the moved ref is the checked-out
    /// branch, `logs/HEAD` receives the entry too.
    pub fn update_ref_with_log(
        &self,
        name: &RefName,
        expected_old: Option<&ObjectId>,
        new_oid: &ObjectId,
        action: &str,
        message: &str,
    ) -> anyhow::Result<()> {
        let target = if name.is_head() {
            self.refs.current_ref()?
        } else {
            name.clone()
        };

        let old = self.refs.read(&target)?;
        self.refs.update(&target, expected_old, new_oid)?;

        let entry = ReflogEntry::new(
            old,
            new_oid.clone(),
            self.config.borrow().author(),
            action,
            message,
        );
        self.reflog.append(&target, &entry)?;

        // every HEAD movement is also visible through logs/HEAD
        if !target.is_head() && self.refs.current_ref()? == target {
            self.reflog.append(&RefName::head(), &entry)?;
        }

        Ok(())
    }
}
