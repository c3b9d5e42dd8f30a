//! An ordered, cursor-accelerated container of `(line_number, text)` pairs.
//!
//! Entries are kept strictly sorted by line number. Insertion, removal and
//! repositioning are all implemented as a bidirectional linear scan starting
//! from a cursor, on the assumption (true for this crate's access pattern:
//! diff output arrives in increasing line-number order, and emission walks
//! forward) that the cursor usually already sits next to the target.
//!
//! Nodes live in a slot arena rather than being individually heap-allocated
//! and linked by raw pointers (the approach `TAILQ(3)` takes in geocalc's
//! `difflist.c`, which this module is ported from); each slot carries a
//! generation counter so a `Cursor` that outlives the removal of the node it
//! pointed at safely reads back as unset instead of aliasing a reused slot.

#[derive(Debug, Clone)]
struct Node {
    n: i64,
    text: String,
    prev: Option<usize>,
    next: Option<usize>,
    generation: u64,
}

/// A detached reference into a [`LineList`]. Unset (`None`) means "no
/// entry" — either the list was empty or a walk ran off one end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    slot: Option<(usize, u64)>,
}

impl Cursor {
    pub const UNSET: Cursor = Cursor { slot: None };

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }
}

pub struct LineList {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    /// Internal hint cursor used to accelerate `insert`/`remove`. Distinct
    /// from any `Cursor` a caller may be holding.
    hint: Option<usize>,
    len: usize,
}

impl LineList {
    pub fn new() -> LineList {
        LineList {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            hint: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn get(&self, idx: usize) -> &Node {
        self.nodes[idx].as_ref().expect("dangling line-list index")
    }

    fn get_mut(&mut self, idx: usize) -> &mut Node {
        self.nodes[idx].as_mut().expect("dangling line-list index")
    }

    fn cursor_of(&self, idx: Option<usize>) -> Cursor {
        match idx {
            Some(i) => Cursor {
                slot: Some((i, self.get(i).generation)),
            },
            None => Cursor::UNSET,
        }
    }

    /// Resolve a `Cursor` to a live slot index, or `None` if it is unset or
    /// stale (its slot has since been reused by a different entry).
    fn resolve(&self, cur: Cursor) -> Option<usize> {
        let (idx, gen) = cur.slot?;
        match &self.nodes[idx] {
            Some(node) if node.generation == gen => Some(idx),
            _ => None,
        }
    }

    fn alloc(&mut self, n: i64, text: String) -> usize {
        if let Some(idx) = self.free.pop() {
            let generation = self.nodes[idx].take().map(|n| n.generation).unwrap_or(0) + 1;
            self.nodes[idx] = Some(Node {
                n,
                text,
                prev: None,
                next: None,
                generation,
            });
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Some(Node {
                n,
                text,
                prev: None,
                next: None,
                generation: 0,
            }));
            idx
        }
    }

    /// Insert `(n, text)`. `n` must not already be present.
    pub fn insert(&mut self, n: i64, text: String) {
        assert!(n > 0, "line numbers are 1-based");

        let insert_after = match self.hint {
            Some(mut cur) => {
                // Walk forward while the hint is strictly behind n.
                while self.get(cur).n < n {
                    match self.get(cur).next {
                        Some(next) => cur = next,
                        None => break,
                    }
                }
                // Walk backward while the hint is strictly ahead of n.
                while self.get(cur).n > n {
                    match self.get(cur).prev {
                        Some(prev) => cur = prev,
                        None => break,
                    }
                }
                assert!(self.get(cur).n != n, "duplicate line number {n}");
                if self.get(cur).n < n {
                    Some(cur)
                } else {
                    // cur.n > n: insert before cur, i.e. after cur's prev.
                    self.get(cur).prev
                }
            }
            None => self.tail,
        };

        let new_idx = self.alloc(n, text);
        match insert_after {
            Some(after) => {
                let old_next = self.get(after).next;
                self.get_mut(after).next = Some(new_idx);
                self.get_mut(new_idx).prev = Some(after);
                self.get_mut(new_idx).next = old_next;
                match old_next {
                    Some(next) => self.get_mut(next).prev = Some(new_idx),
                    None => self.tail = Some(new_idx),
                }
            }
            None => {
                // Insert at the head (list empty, or n is smaller than everything).
                self.get_mut(new_idx).next = self.head;
                match self.head {
                    Some(old_head) => self.get_mut(old_head).prev = Some(new_idx),
                    None => self.tail = Some(new_idx),
                }
                self.head = Some(new_idx);
            }
        }
        self.hint = Some(new_idx);
        self.len += 1;
    }

    /// Remove the entry with line number `n`, if present. A no-op otherwise.
    pub fn remove(&mut self, n: i64) {
        let Some(target) = self.locate_from_hint(n) else {
            return;
        };
        if self.get(target).n != n {
            return;
        }

        let next = self.get(target).next;
        let prev = self.get(target).prev;
        match prev {
            Some(p) => self.get_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(nx) => self.get_mut(nx).prev = prev,
            None => self.tail = prev,
        }

        self.hint = match next {
            Some(nx) => Some(nx),
            None => prev,
        };

        self.nodes[target] = None;
        self.free.push(target);
        self.len -= 1;
    }

    /// Move `cur` (a slot index, already resolved) near line `n`, walking
    /// bidirectionally. Returns the nearest slot, which may land on, before
    /// or after `n` depending on availability.
    fn locate_from_hint(&self, n: i64) -> Option<usize> {
        let mut cur = self.hint?;
        while self.get(cur).n < n {
            match self.get(cur).next {
                Some(next) => cur = next,
                None => break,
            }
        }
        while self.get(cur).n > n {
            match self.get(cur).prev {
                Some(prev) => cur = prev,
                None => break,
            }
        }
        Some(cur)
    }

    pub fn first(&mut self) -> Cursor {
        self.hint = self.head;
        self.cursor_of(self.head)
    }

    pub fn last(&mut self) -> Cursor {
        self.hint = self.tail;
        self.cursor_of(self.tail)
    }

    pub fn current(&self) -> Cursor {
        self.cursor_of(self.hint)
    }

    /// Find the entry with line number `n`. Repositions the internal hint to
    /// the nearest entry `<= n`.
    pub fn find(&mut self, n: i64) -> Cursor {
        let Some(near) = self.locate_from_hint(n) else {
            return Cursor::UNSET;
        };
        if self.get(near).n > n {
            // near is the smallest entry and it's still > n: no entry <= n.
            self.hint = Some(near);
            return Cursor::UNSET;
        }
        self.hint = Some(near);
        if self.get(near).n == n {
            self.cursor_of(Some(near))
        } else {
            Cursor::UNSET
        }
    }

    pub fn line_number(&self, cur: Cursor) -> Option<i64> {
        self.resolve(cur).map(|i| self.get(i).n)
    }

    pub fn text(&self, cur: Cursor) -> Option<&str> {
        self.resolve(cur).map(|i| self.get(i).text.as_str())
    }

    /// Move `it` forward to the leftmost entry with number `>= n`. Becomes
    /// unset iff every entry is `< n`.
    pub fn go_ge(&self, it: &mut Cursor, n: i64) {
        let Some(mut cur) = self.resolve(*it).or(self.head) else {
            *it = Cursor::UNSET;
            return;
        };
        if self.get(cur).n < n {
            while self.get(cur).n < n {
                match self.get(cur).next {
                    Some(next) => cur = next,
                    None => break,
                }
            }
        } else {
            while let Some(prev) = self.get(cur).prev {
                if self.get(prev).n >= n {
                    cur = prev;
                } else {
                    break;
                }
            }
        }
        *it = if self.get(cur).n < n {
            Cursor::UNSET
        } else {
            self.cursor_of(Some(cur))
        };
    }

    /// Move `it` to the rightmost entry with number `<= n`. Becomes unset
    /// iff every entry is `> n`.
    pub fn go_le(&self, it: &mut Cursor, n: i64) {
        let Some(mut cur) = self.resolve(*it).or(self.tail) else {
            *it = Cursor::UNSET;
            return;
        };
        if self.get(cur).n > n {
            while self.get(cur).n > n {
                match self.get(cur).prev {
                    Some(prev) => cur = prev,
                    None => break,
                }
            }
        } else {
            while let Some(next) = self.get(cur).next {
                if self.get(next).n <= n {
                    cur = next;
                } else {
                    break;
                }
            }
        }
        *it = if self.get(cur).n > n {
            Cursor::UNSET
        } else {
            self.cursor_of(Some(cur))
        };
    }

    pub fn next(&self, it: &mut Cursor) {
        *it = match self.resolve(*it) {
            Some(i) => self.cursor_of(self.get(i).next),
            None => Cursor::UNSET,
        };
    }
}

impl Default for LineList {
    fn default() -> Self {
        Self::new()
    }
}
