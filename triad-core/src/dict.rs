//! Dictionary encoding between resources and dense integer codes.
//!
//! [`Dictionary`] stores forward mappings in a `Vec<Resource>` (O(1) index
//! lookup, zero hashing) and reverse mappings in a
//! `HashMap<Resource, Code>` (single hash lookup). Resources carry
//! `Arc<str>` payloads, so the entry stored on each side shares one string
//! allocation.
//!
//! Codes are assigned densely in first-insertion order and are never
//! reassigned; entries are immortal.

use hashbrown::HashMap;

use crate::term::{
    Code, CodedTriple, CodedTriplePattern, CodedVarMap, Resource, Term, Triple, TriplePattern,
    VarMap,
};

/// Insert-only bijection between [`Resource`]s and [`Code`]s.
#[derive(Clone, Debug, Default)]
pub struct Dictionary {
    entries: Vec<Resource>,
    reverse: HashMap<Resource, Code>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or assign a code for `r`.
    ///
    /// If `r` is already present, returns the existing code. Otherwise
    /// allocates the next dense code and inserts into both the forward
    /// and reverse structures.
    pub fn encode(&mut self, r: &Resource) -> Code {
        if let Some(&code) = self.reverse.get(r) {
            return code;
        }

        let code = Code(
            u64::try_from(self.entries.len()).expect("dictionary code overflow: too many entries"),
        );
        self.entries.push(r.clone());
        self.reverse.insert(r.clone(), code);
        code
    }

    /// Forward lookup: resolve a code to the resource it was assigned to.
    ///
    /// Precondition: `code` was returned by [`encode`](Self::encode) on
    /// this dictionary. An unassigned code is a programmer error.
    #[inline]
    pub fn decode(&self, code: Code) -> &Resource {
        debug_assert!(
            (code.0 as usize) < self.entries.len(),
            "decode of unassigned code {code}",
        );
        &self.entries[code.0 as usize]
    }

    /// Reverse lookup without assignment.
    #[inline]
    pub fn find(&self, r: &Resource) -> Option<Code> {
        self.reverse.get(r).copied()
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode_term(&mut self, t: &Term) -> Term<Code> {
        match t {
            Term::Var(v) => Term::Var(v.clone()),
            Term::Res(r) => Term::Res(self.encode(r)),
        }
    }

    pub fn decode_term(&self, t: &Term<Code>) -> Term {
        match t {
            Term::Var(v) => Term::Var(v.clone()),
            Term::Res(c) => Term::Res(self.decode(*c).clone()),
        }
    }

    pub fn encode_triple(&mut self, t: &Triple) -> CodedTriple {
        Triple {
            s: self.encode(&t.s),
            p: self.encode(&t.p),
            o: self.encode(&t.o),
        }
    }

    pub fn decode_triple(&self, t: &CodedTriple) -> Triple {
        Triple {
            s: self.decode(t.s).clone(),
            p: self.decode(t.p).clone(),
            o: self.decode(t.o).clone(),
        }
    }

    pub fn encode_pattern(&mut self, pat: &TriplePattern) -> CodedTriplePattern {
        TriplePattern {
            s: self.encode_term(&pat.s),
            p: self.encode_term(&pat.p),
            o: self.encode_term(&pat.o),
        }
    }

    pub fn decode_pattern(&self, pat: &CodedTriplePattern) -> TriplePattern {
        TriplePattern {
            s: self.decode_term(&pat.s),
            p: self.decode_term(&pat.p),
            o: self.decode_term(&pat.o),
        }
    }

    pub fn decode_var_map(&self, vm: &CodedVarMap) -> VarMap {
        vm.iter()
            .map(|(v, c)| (v.clone(), self.decode(*c).clone()))
            .collect()
    }
}
