use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::collections::HashMap;

/// A node in the reversed-byte domain trie.
#[derive(Default)]
struct TrieNode {
    children: HashMap<u8, TrieNode, FxBuildHasher>,
    /// Marks the end of a reversed blocked domain. Monotone: once set it is
    /// never cleared for the lifetime of the process; removals require a
    /// rebuild (process restart).
    is_terminal: bool,
}

impl TrieNode {
    fn new() -> Self {
        Self {
            children: HashMap::with_hasher(FxBuildHasher),
            is_terminal: false,
        }
    }
}

/// Reverse-suffix trie answering "is this domain or any parent label blocked?".
///
/// Domains are inserted byte-by-byte in reverse, so `bad.com` becomes the
/// path `m → o → c → . → d → a → b`. A rule then matches its own domain
/// exactly and every subdomain: during the reverse walk of a query, landing
/// on a terminal node right before a `.` means the remaining prefix is a
/// subdomain label, which is exactly the wildcard case.
///
/// One readers-writer lock guards the whole structure. Lookups take the read
/// lock and allocate nothing; writers are rare (startup bulk load, one insert
/// per confirmed scan, periodic reload).
pub struct DomainTrie {
    root: RwLock<TrieNode>,
    terminal_count: RwLock<usize>,
}

impl DomainTrie {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(TrieNode::new()),
            terminal_count: RwLock::new(0),
        }
    }

    /// Insert a single domain.
    pub fn insert(&self, domain: &str) {
        if domain.is_empty() {
            return;
        }
        let mut root = self.root.write();
        let added = Self::insert_locked(&mut root, domain);
        if added {
            *self.terminal_count.write() += 1;
        }
    }

    /// Insert a batch under a single write-lock acquisition.
    pub fn bulk_insert<I, S>(&self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = self.root.write();
        let mut added = 0usize;
        for domain in domains {
            let domain = domain.as_ref();
            if domain.is_empty() {
                continue;
            }
            if Self::insert_locked(&mut root, domain) {
                added += 1;
            }
        }
        if added > 0 {
            *self.terminal_count.write() += added;
        }
    }

    fn insert_locked(root: &mut TrieNode, domain: &str) -> bool {
        let mut node = root;
        for byte in domain.bytes().rev() {
            node = node.children.entry(byte).or_insert_with(TrieNode::new);
        }
        let newly_terminal = !node.is_terminal;
        node.is_terminal = true;
        newly_terminal
    }

    /// Whether `domain` or any of its parent labels carries a block rule.
    ///
    /// Walks the reversed query bytes. Standing on a terminal node while the
    /// next byte to consume is `.` means the query is a subdomain of a rule
    /// (`ads.google.com` against rule `google.com`). A terminal node followed
    /// by any other byte is not a match, which keeps `notgoogle.com` clean.
    /// Consuming the whole query on a terminal node is the exact match.
    pub fn should_block(&self, domain: &str) -> bool {
        if domain.is_empty() {
            return false;
        }

        let root = self.root.read();
        let mut node: &TrieNode = &root;

        for byte in domain.bytes().rev() {
            if node.is_terminal && byte == b'.' {
                return true;
            }
            match node.children.get(&byte) {
                Some(child) => node = child,
                None => return false,
            }
        }

        node.is_terminal
    }

    /// Number of distinct blocked domains inserted so far.
    pub fn len(&self) -> usize {
        *self.terminal_count.read()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DomainTrie {
    fn default() -> Self {
        Self::new()
    }
}
