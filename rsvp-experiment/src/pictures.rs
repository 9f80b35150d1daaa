use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use rsvp_core::PictureId;
use thiserror::Error;
use tracing::{info, warn};

use crate::pool::{Pool, PoolError, PoolLabel};

/// Problems found before the first trial. The session never starts.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("picture folder '{}' not found", .0.display())]
    MissingDirectory(PathBuf),
    #[error("no pictures found in '{}'", .0.display())]
    NoPictures(PathBuf),
    #[error("cannot read picture folder '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lists picture files in `dir` whose extension is one of `extensions`, shuffled.
pub fn load_picture_names<R: Rng + ?Sized>(
    dir: &Path,
    extensions: &[String],
    rng: &mut R,
) -> Result<Vec<PictureId>, SetupError> {
    if !dir.is_dir() {
        return Err(SetupError::MissingDirectory(dir.to_path_buf()));
    }
    let io_err = |source| SetupError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if !matches || !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.push(PictureId::from(name));
        }
    }

    if names.is_empty() {
        return Err(SetupError::NoPictures(dir.to_path_buf()));
    }
    // read_dir order is platform dependent; sort so a seeded shuffle is reproducible
    names.sort();
    names.shuffle(rng);
    info!(count = names.len(), dir = %dir.display(), "pictures found");
    Ok(names)
}

/// The disjoint "old" (shown in RSVP frames) and "new" (test distractor) pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PicturePools {
    old: Pool<PictureId>,
    new: Pool<PictureId>,
}

impl PicturePools {
    /// Splits `files` into an old prefix of `n_old` and a new block of `n_new`.
    /// Only the new block is shuffled here; `files` is expected to arrive shuffled.
    ///
    /// With fewer files than needed the list is repeated to length. That breaks
    /// the one-use-per-picture guarantee and is only good for trying the script out.
    pub fn allocate<R: Rng + ?Sized>(
        files: Vec<PictureId>,
        n_old: usize,
        n_new: usize,
        rng: &mut R,
    ) -> Self {
        let needed = n_old + n_new;
        let mut files = files;
        if files.len() < needed && !files.is_empty() {
            warn!(
                needed,
                found = files.len(),
                "NOT ENOUGH PICTURES: reusing pictures, for testing only"
            );
            files = files.iter().cycle().take(needed).cloned().collect();
        }
        files.truncate(needed);
        let new_items = files.split_off(n_old.min(files.len()));

        let pools = Self {
            old: Pool::new(PoolLabel::OldPictures, files),
            new: Pool::shuffled(PoolLabel::NewPictures, new_items, rng),
        };
        info!(
            old = pools.old.len(),
            new = pools.new.len(),
            "picture pools allocated"
        );
        pools
    }

    pub fn pop_old(&mut self) -> Result<PictureId, PoolError> {
        self.old.pop()
    }

    pub fn pop_new(&mut self) -> Result<PictureId, PoolError> {
        self.new.pop()
    }

    pub fn old(&self) -> &Pool<PictureId> {
        &self.old
    }

    pub fn new_pool(&self) -> &Pool<PictureId> {
        &self.new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn names(n: usize) -> Vec<PictureId> {
        (0..n).map(|i| PictureId::from(format!("pic{i:03}.jpg"))).collect()
    }

    #[test]
    fn exact_supply_partitions_without_overlap() {
        let mut rng = StdRng::seed_from_u64(21);
        let files = names(60);
        let pools = PicturePools::allocate(files.clone(), 40, 20, &mut rng);

        assert_eq!(pools.old().len(), 40);
        assert_eq!(pools.new_pool().len(), 20);
        assert_eq!(pools.old().items(), &files[..40]);

        let old: HashSet<_> = pools.old().items().iter().collect();
        let new: HashSet<_> = pools.new_pool().items().iter().collect();
        assert_eq!(old.len(), 40);
        assert_eq!(new.len(), 20);
        assert!(old.is_disjoint(&new));
        assert_eq!(new, files[40..].iter().collect::<HashSet<_>>());
    }

    #[test]
    fn surplus_pictures_are_left_out() {
        let mut rng = StdRng::seed_from_u64(22);
        let pools = PicturePools::allocate(names(100), 40, 20, &mut rng);
        assert_eq!(pools.old().len(), 40);
        assert_eq!(pools.new_pool().len(), 20);
    }

    #[test]
    fn shortage_cycles_pictures_to_length() {
        let mut rng = StdRng::seed_from_u64(23);
        let pools = PicturePools::allocate(names(7), 40, 20, &mut rng);
        assert_eq!(pools.old().len(), 40);
        assert_eq!(pools.new_pool().len(), 20);
        assert_eq!(pools.old().items()[7], pools.old().items()[0]);
    }

    #[test]
    fn empty_pool_pop_fails_loudly() {
        let mut rng = StdRng::seed_from_u64(24);
        let mut pools = PicturePools::allocate(names(2), 1, 1, &mut rng);
        assert!(pools.pop_old().is_ok());
        assert!(pools.pop_new().is_ok());
        assert_eq!(
            pools.pop_old(),
            Err(PoolError::Exhausted {
                pool: PoolLabel::OldPictures
            })
        );
        assert_eq!(
            pools.pop_new(),
            Err(PoolError::Exhausted {
                pool: PoolLabel::NewPictures
            })
        );
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rsvp-pictures-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_only_picture_files() {
        let dir = scratch_dir("load");
        for f in ["a.jpg", "b.PNG", "c.jpeg", "notes.txt"] {
            fs::write(dir.join(f), b"").unwrap();
        }
        fs::create_dir(dir.join("sub.jpg")).unwrap();

        let exts = vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()];
        let mut rng = StdRng::seed_from_u64(25);
        let mut found = load_picture_names(&dir, &exts, &mut rng).unwrap();
        found.sort();
        assert_eq!(
            found,
            vec![
                PictureId::from("a.jpg"),
                PictureId::from("b.PNG"),
                PictureId::from("c.jpeg"),
            ]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_or_empty_folder_is_a_setup_error() {
        let exts = vec!["jpg".to_string()];
        let mut rng = StdRng::seed_from_u64(26);

        let missing = std::env::temp_dir().join("rsvp-pictures-does-not-exist");
        assert!(matches!(
            load_picture_names(&missing, &exts, &mut rng),
            Err(SetupError::MissingDirectory(_))
        ));

        let dir = scratch_dir("empty");
        assert!(matches!(
            load_picture_names(&dir, &exts, &mut rng),
            Err(SetupError::NoPictures(_))
        ));
        fs::remove_dir_all(&dir).unwrap();
    }
}
