// src/noyau/trig.rs
//
// Angles remarquables : sin/cos/tan d’un multiple rationnel de π
// --------------------------------------------------------------
// - coeff·π extrait par coeff_pi()
// - angle ramené dans [0, 2π) par mod_rationnel()
// - dénominateurs reconnus : 1, 2, 3, 4, 6 ; sinon l’appel reste symbolique

use log::trace;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use super::expr::{mod_rationnel, Expr};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrigOutcome {
    Valeur(Expr),
    Indefini,
}

/// Valeur exacte “lisible” : ±(r) ou ±(√s / d).
#[derive(Clone, Copy)]
enum Exacte {
    Zero,
    Un(i8),
    Demi(i8),
    Racine(i8, i64, i64), // signe, radicande, dénominateur
    Aucune,                // tan(π/2) et consorts
}

impl Exacte {
    fn vers_expr(self) -> Option<Expr> {
        let signe = |s: i8, e: Expr| if s < 0 { Expr::oppose(e) } else { e };
        match self {
            Exacte::Zero => Some(Expr::entier(0)),
            Exacte::Un(s) => Some(Expr::entier(s as i64)),
            Exacte::Demi(s) => Some(Expr::Rat(BigRational::new(
                BigInt::from(s as i64),
                BigInt::from(2),
            ))),
            Exacte::Racine(s, r, 1) => Some(signe(s, Expr::Sqrt(Box::new(Expr::entier(r))))),
            Exacte::Racine(s, r, d) => Some(signe(
                s,
                Expr::Div(
                    Box::new(Expr::Sqrt(Box::new(Expr::entier(r)))),
                    Box::new(Expr::entier(d)),
                ),
            )),
            Exacte::Aucune => None,
        }
    }
}

/// sin(kπ/n) pour k/n dans [0, 2) : symétries ramenées au premier quadrant.
fn table_sin(k: i64, n: i64) -> Option<Exacte> {
    // sin(π + a) = -sin(a)
    let (k, signe) = if k >= n { (k - n, -1) } else { (k, 1) };
    // sin(π - a) = sin(a)
    let k = if 2 * k > n { n - k } else { k };
    Some(match (k, n) {
        (0, _) => Exacte::Zero,
        (1, 6) => Exacte::Demi(signe),
        (1, 4) => Exacte::Racine(signe, 2, 2),
        (1, 3) => Exacte::Racine(signe, 3, 2),
        (1, 2) => Exacte::Un(signe),
        _ => return None,
    })
}

fn table_cos(k: i64, n: i64) -> Option<Exacte> {
    // cos(a) = sin(a + π/2)
    let decale = mod_rationnel(&BigRational::new((2 * k + n).into(), (2 * n).into()), 2);
    let (k, n) = petit_kn(&decale)?;
    table_sin(k, n)
}

fn table_tan(k: i64, n: i64) -> Option<Exacte> {
    let s = table_sin(k, n)?;
    let c = table_cos(k, n)?;
    Some(match (s, c) {
        (_, Exacte::Zero) => Exacte::Aucune,
        (Exacte::Zero, _) => Exacte::Zero,
        (Exacte::Racine(a, 2, 2), Exacte::Racine(b, 2, 2)) => Exacte::Un(a * b),
        (Exacte::Demi(a), Exacte::Racine(b, 3, 2)) => Exacte::Racine(a * b, 3, 3),
        (Exacte::Racine(a, 3, 2), Exacte::Demi(b)) => Exacte::Racine(a * b, 3, 1),
        _ => return None,
    })
}

/// Reconnaît sin/cos/tan d’un angle remarquable.
/// - Some(Valeur(e)) : valeur exacte
/// - Some(Indefini) : tan(π/2 + kπ)
/// - None : non reconnu (l’appel reste symbolique)
pub fn trig_special(x: &Expr, f: TrigFn) -> Option<TrigOutcome> {
    let coeff = x.coeff_pi()?;
    let (k, n) = petit_kn(&mod_rationnel(&coeff, 2))?;

    let exacte = match f {
        TrigFn::Sin => table_sin(k, n)?,
        TrigFn::Cos => table_cos(k, n)?,
        TrigFn::Tan => table_tan(k, n)?,
    };

    let out = match exacte.vers_expr() {
        Some(e) => TrigOutcome::Valeur(e),
        None => TrigOutcome::Indefini,
    };
    trace!("{f:?}({k}π/{n}) -> {out:?}");
    Some(out)
}

/// Remplace chaque sin/cos/tan d’angle remarquable dans l’arbre (arguments déjà simplifiés).
pub fn appliquer_trig_speciale(e: &Expr) -> Expr {
    e.transformer(&mut |n: &Expr| {
        let (arg, f) = match n {
            Expr::Sin(x) => (x, TrigFn::Sin),
            Expr::Cos(x) => (x, TrigFn::Cos),
            Expr::Tan(x) => (x, TrigFn::Tan),
            _ => return None,
        };
        let arg = appliquer_trig_speciale(arg);
        Some(match trig_special(&arg, f) {
            Some(TrigOutcome::Valeur(v)) => v,
            Some(TrigOutcome::Indefini) => Expr::Indefini,
            None => match f {
                TrigFn::Sin => Expr::Sin(Box::new(arg)),
                TrigFn::Cos => Expr::Cos(Box::new(arg)),
                TrigFn::Tan => Expr::Tan(Box::new(arg)),
            },
        })
    })
}

/// Rationnel réduit -> (k, n) en i64, n ∈ {1, 2, 3, 4, 6}.
fn petit_kn(r: &BigRational) -> Option<(i64, i64)> {
    let n = r.denom().to_i64()?;
    let k = r.numer().to_i64()?;
    [1, 2, 3, 4, 6].contains(&n).then_some((k, n))
}
