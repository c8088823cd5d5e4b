//! Shared constants for the Stowage pipeline.

/// Default digest algorithm. MD5 keeps manifests interchangeable with the origin's tooling.
pub const DEFAULT_HASH_ALGORITHM: &str = "md5";

/// Default read chunk size for hashing (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Default number of hashing threads (0 = available parallelism).
pub const DEFAULT_THREADS: usize = 0;

/// Default authoritative manifest path (generate output / verify input).
pub const DEFAULT_MANIFEST_PATH: &str = "md5_list.json";

/// Default verification report path.
pub const DEFAULT_REPORT_PATH: &str = "verification_report.txt";

/// Default path of the locally built manifest used during verification.
pub const DEFAULT_LOCAL_MANIFEST_PATH: &str = "local_md5.json";

/// Bookkeeping file skipped by the flatten utility.
pub const DEFAULT_EXCLUDE_NAME: &str = ".DS_Store";

/// Default staging root.
pub const DEFAULT_STAGE_ROOT: &str = "/ipfsdata";

/// Default mover source root.
pub const DEFAULT_MOVER_SOURCE: &str = "/ipfsdata/car";

/// Default mover destination root.
pub const DEFAULT_MOVER_DEST: &str = "/datacap";

/// Default mover filename prefix.
pub const DEFAULT_MOVER_PREFIX: &str = "baga6ea4seaq";

/// Default mover filename suffix.
pub const DEFAULT_MOVER_SUFFIX: &str = ".car";

/// Default mover poll interval in seconds.
pub const DEFAULT_MOVER_INTERVAL_SECS: u64 = 60;

/// Report separator width.
pub const REPORT_RULE_WIDTH: usize = 50;

/// Supported digest algorithm names.
pub const SUPPORTED_HASH_ALGORITHMS: &[&str] = &["md5", "xxh3"];
