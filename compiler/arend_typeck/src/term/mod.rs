//! Core terms.
//!
//! Elaboration turns concrete expressions into [`Term`]s. Binders keep the
//! [`LocalId`] the resolver gave them, so terms are named rather than de
//! Bruijn indexed; substitution renames a binder whenever it would capture a
//! free variable of the substituted value.

use std::fmt;

use arend_ir::{DefId, LocalId};
use arend_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Placeholder for an omitted implicit argument or an `_` in a term.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
pub struct HoleId(u32);

impl HoleId {
    pub const fn new(raw: u32) -> Self {
        HoleId(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Term {
    /// `\Type`, itself of type `\Type`.
    Universe,
    Var(LocalId),
    Global(DefId),
    Hole(HoleId),
    /// Literal of the prelude `Nat`.
    Number(u64),
    Pi {
        param: LocalId,
        explicit: bool,
        domain: Box<Term>,
        codomain: Box<Term>,
    },
    Lam {
        param: LocalId,
        explicit: bool,
        domain: Box<Term>,
        body: Box<Term>,
    },
    App {
        fun: Box<Term>,
        arg: Box<Term>,
        explicit: bool,
    },
    /// Stand-in for something that failed to elaborate. Convertible with
    /// everything, so one error does not cascade.
    Error,
}

/// Arguments of an application spine, in application order.
pub type Spine<'a> = SmallVec<[(&'a Term, bool); 4]>;

/// One entry of a telescope.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub id: LocalId,
    pub explicit: bool,
    pub ty: Term,
}

impl Term {
    pub fn pi(param: LocalId, explicit: bool, domain: Term, codomain: Term) -> Term {
        Term::Pi {
            param,
            explicit,
            domain: Box::new(domain),
            codomain: Box::new(codomain),
        }
    }

    pub fn lam(param: LocalId, explicit: bool, domain: Term, body: Term) -> Term {
        Term::Lam {
            param,
            explicit,
            domain: Box::new(domain),
            body: Box::new(body),
        }
    }

    pub fn app(fun: Term, arg: Term, explicit: bool) -> Term {
        Term::App {
            fun: Box::new(fun),
            arg: Box::new(arg),
            explicit,
        }
    }

    pub fn apps(head: Term, args: impl IntoIterator<Item = (Term, bool)>) -> Term {
        args.into_iter()
            .fold(head, |fun, (arg, explicit)| Term::app(fun, arg, explicit))
    }

    /// Non-dependent function type.
    pub fn arrow(domain: Term, codomain: Term) -> Term {
        Term::pi(LocalId::fresh(), true, domain, codomain)
    }

    /// Head and arguments of an application spine.
    pub fn spine(&self) -> (&Term, Spine<'_>) {
        let mut args = Spine::new();
        let mut head = self;
        while let Term::App { fun, arg, explicit } = head {
            args.push((&**arg, *explicit));
            head = fun;
        }
        args.reverse();
        (head, args)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Term::Error)
    }

    /// Whether `var` occurs free.
    pub fn occurs(&self, var: LocalId) -> bool {
        match self {
            Term::Var(v) => *v == var,
            Term::Universe | Term::Global(_) | Term::Hole(_) | Term::Number(_) | Term::Error => {
                false
            }
            Term::Pi {
                param,
                domain,
                codomain: body,
                ..
            }
            | Term::Lam {
                param,
                domain,
                body,
                ..
            } => domain.occurs(var) || (*param != var && body.occurs(var)),
            Term::App { fun, arg, .. } => fun.occurs(var) || arg.occurs(var),
        }
    }

    pub fn mentions_hole(&self, hole: HoleId) -> bool {
        self.any(&|term| matches!(term, Term::Hole(h) if *h == hole))
    }

    pub fn mentions_error(&self) -> bool {
        self.any(&|term| term.is_error())
    }

    fn any(&self, pred: &impl Fn(&Term) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Term::Pi {
                domain,
                codomain: body,
                ..
            }
            | Term::Lam { domain, body, .. } => domain.any(pred) || body.any(pred),
            Term::App { fun, arg, .. } => fun.any(pred) || arg.any(pred),
            _ => false,
        }
    }

    /// `self[var := value]`.
    pub fn subst(&self, var: LocalId, value: &Term) -> Term {
        let mut map = FxHashMap::default();
        map.insert(var, value.clone());
        self.subst_all(&map)
    }

    /// Simultaneous, capture-avoiding substitution.
    pub fn subst_all(&self, map: &FxHashMap<LocalId, Term>) -> Term {
        if map.is_empty() {
            return self.clone();
        }
        ensure_sufficient_stack(|| match self {
            Term::Var(v) => map.get(v).cloned().unwrap_or(Term::Var(*v)),
            Term::Universe | Term::Global(_) | Term::Hole(_) | Term::Number(_) | Term::Error => {
                self.clone()
            }
            Term::App { fun, arg, explicit } => {
                Term::app(fun.subst_all(map), arg.subst_all(map), *explicit)
            }
            Term::Pi {
                param,
                explicit,
                domain,
                codomain,
            } => {
                let domain = domain.subst_all(map);
                let (param, codomain) = subst_under(*param, codomain, map);
                Term::pi(param, *explicit, domain, codomain)
            }
            Term::Lam {
                param,
                explicit,
                domain,
                body,
            } => {
                let domain = domain.subst_all(map);
                let (param, body) = subst_under(*param, body, map);
                Term::lam(param, *explicit, domain, body)
            }
        })
    }

    /// Rewrite every hole with `solve`, leaving holes it returns `None` for.
    pub fn map_holes(&self, solve: &mut impl FnMut(HoleId) -> Option<Term>) -> Term {
        ensure_sufficient_stack(|| match self {
            Term::Hole(h) => solve(*h).unwrap_or(Term::Hole(*h)),
            Term::Universe | Term::Var(_) | Term::Global(_) | Term::Number(_) | Term::Error => {
                self.clone()
            }
            Term::App { fun, arg, explicit } => {
                Term::app(fun.map_holes(solve), arg.map_holes(solve), *explicit)
            }
            Term::Pi {
                param,
                explicit,
                domain,
                codomain,
            } => Term::pi(
                *param,
                *explicit,
                domain.map_holes(solve),
                codomain.map_holes(solve),
            ),
            Term::Lam {
                param,
                explicit,
                domain,
                body,
            } => Term::lam(
                *param,
                *explicit,
                domain.map_holes(solve),
                body.map_holes(solve),
            ),
        })
    }

    pub fn display<'a>(&'a self, names: &'a dyn Names) -> TermDisplay<'a> {
        TermDisplay { term: self, names }
    }
}

/// Substitute under a binder, renaming it when a substituted value would be
/// captured.
fn subst_under(param: LocalId, body: &Term, map: &FxHashMap<LocalId, Term>) -> (LocalId, Term) {
    let captures = map
        .iter()
        .any(|(var, value)| *var != param && value.occurs(param) && body.occurs(*var));
    if !captures && !map.contains_key(&param) {
        return (param, body.subst_all(map));
    }
    let mut inner = map.clone();
    inner.remove(&param);
    if captures {
        let fresh = LocalId::fresh();
        inner.insert(param, Term::Var(fresh));
        (fresh, body.subst_all(&inner))
    } else {
        (param, body.subst_all(&inner))
    }
}

/// `\Pi params -> result`.
pub fn pis(params: &[Param], result: Term) -> Term {
    params.iter().rev().fold(result, |codomain, param| {
        Term::pi(param.id, param.explicit, param.ty.clone(), codomain)
    })
}

/// `\lam params => body`.
pub fn lams(params: &[Param], body: Term) -> Term {
    params.iter().rev().fold(body, |body, param| {
        Term::lam(param.id, param.explicit, param.ty.clone(), body)
    })
}

/// Parameters as arguments, e.g. for `D A B` from the telescope of `D`.
pub fn param_args(params: &[Param]) -> impl Iterator<Item = (Term, bool)> + '_ {
    params
        .iter()
        .map(|param| (Term::Var(param.id), param.explicit))
}

/// Names used when printing terms in messages.
pub trait Names {
    fn local(&self, id: LocalId) -> Option<String>;
    fn global(&self, id: DefId) -> String;
}

pub struct TermDisplay<'a> {
    term: &'a Term,
    names: &'a dyn Names,
}

// Printing levels: 0 binders allowed, 1 application, 2 atom.
impl TermDisplay<'_> {
    fn write(&self, term: &Term, level: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match term {
            Term::Universe => f.write_str("\\Type"),
            Term::Var(id) => match self.names.local(*id) {
                Some(name) => f.write_str(&name),
                None => write!(f, "x{}", id.raw()),
            },
            Term::Global(id) => f.write_str(&self.names.global(*id)),
            Term::Hole(hole) => write!(f, "?{}", hole.raw()),
            Term::Number(n) => write!(f, "{n}"),
            Term::Error => f.write_str("{?}"),
            Term::App { .. } => {
                let (head, args) = term.spine();
                if level > 1 {
                    f.write_str("(")?;
                }
                self.write(head, 2, f)?;
                for (arg, explicit) in args {
                    if explicit {
                        f.write_str(" ")?;
                        self.write(arg, 2, f)?;
                    } else {
                        f.write_str(" {")?;
                        self.write(arg, 0, f)?;
                        f.write_str("}")?;
                    }
                }
                if level > 1 {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Term::Pi {
                param,
                explicit,
                domain,
                codomain,
            } => {
                if level > 0 {
                    f.write_str("(")?;
                }
                if *explicit && !codomain.occurs(*param) {
                    self.write(domain, 1, f)?;
                } else {
                    let (open, close) = if *explicit { ("(", ")") } else { ("{", "}") };
                    write!(f, "\\Pi {open}")?;
                    self.write(&Term::Var(*param), 2, f)?;
                    f.write_str(" : ")?;
                    self.write(domain, 0, f)?;
                    f.write_str(close)?;
                }
                f.write_str(" -> ")?;
                self.write(codomain, 0, f)?;
                if level > 0 {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Term::Lam {
                param,
                explicit,
                body,
                ..
            } => {
                if level > 0 {
                    f.write_str("(")?;
                }
                f.write_str("\\lam ")?;
                if *explicit {
                    self.write(&Term::Var(*param), 2, f)?;
                } else {
                    f.write_str("{")?;
                    self.write(&Term::Var(*param), 2, f)?;
                    f.write_str("}")?;
                }
                f.write_str(" => ")?;
                self.write(body, 0, f)?;
                if level > 0 {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(self.term, 0, f)
    }
}
