// src/noyau/format.rs
//
// Expr -> LaTeX
// -------------
// - parenthèses “auto” : seulement là où la précédence l’exige (\left( … \right))
// - produit implicite masqué ("2 x") ou explicite (\cdot) selon les options
// - noms : une lettre => tel quel ; plusieurs => \mathrm{…} ; grec => \alpha ; x_1 => x_{1}
// - rationnels : entier, \frac{p}{q}, ou décimal exact (saisie "0.25"), ou arrondi (mode décimal)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::expr::Expr;
use super::lecture::{arrondir, arrondir_rationnel, DECIMALES_MAX};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OptionsLatex {
    /// Produit implicite affiché sans opérateur ("2x") ; sinon \cdot.
    pub masquer_implicite: bool,
    /// Rationnels à développement décimal fini écrits en décimal (0.25 plutôt que \frac{1}{4}).
    pub rationnels_decimaux: bool,
    /// Lecture décimale : chaque rationnel arrondi à n chiffres.
    pub arrondi: Option<usize>,
}

impl OptionsLatex {
    /// Affichage d’une saisie (reflète ce que l’utilisateur a tapé).
    pub const SAISIE: OptionsLatex = OptionsLatex {
        masquer_implicite: true,
        rationnels_decimaux: true,
        arrondi: None,
    };

    /// Affichage d’un résultat symbolique exact.
    pub const EXACT: OptionsLatex = OptionsLatex {
        masquer_implicite: true,
        rationnels_decimaux: false,
        arrondi: None,
    };

    pub fn decimal(chiffres: usize) -> OptionsLatex {
        OptionsLatex {
            masquer_implicite: true,
            rationnels_decimaux: true,
            arrondi: Some(chiffres),
        }
    }
}

/* ------------------------ Précédence (pour les parenthèses auto) ------------------------ */

fn est_zero(e: &Expr) -> bool {
    matches!(e, Expr::Rat(r) if r.is_zero())
}

/// Forme “-x” à l’affichage (rationnel négatif ou Sub(0, x)).
fn est_negatif(e: &Expr) -> bool {
    match e {
        Expr::Rat(r) => r.is_negative(),
        Expr::Sub(a, _) => est_zero(a),
        _ => false,
    }
}

fn niveau(e: &Expr) -> u8 {
    use Expr::*;
    match e {
        _ if est_negatif(e) => 2,
        Add(_, _) | Sub(_, _) => 1,
        Mul(_, _) | Implicite(_, _) => 2,
        Pow(_, _) => 3,
        _ => 4,
    }
}

fn parentheses(s: &str) -> String {
    format!("\\left({s}\\right)")
}

/* ------------------------ Rationnels ------------------------ */

/// Nombre de décimales d’un développement fini (dénominateur 2^a·5^b), sinon None.
fn decimales_finies(d: &BigInt) -> Option<usize> {
    let mut reste = d.clone();
    let (mut a, mut b) = (0usize, 0usize);
    let deux = BigInt::from(2);
    let cinq = BigInt::from(5);
    while (&reste % &deux).is_zero() {
        reste /= &deux;
        a += 1;
    }
    while (&reste % &cinq).is_zero() {
        reste /= &cinq;
        b += 1;
    }
    if reste.is_one() {
        Some(a.max(b))
    } else {
        None
    }
}

fn latex_rationnel(r: &BigRational, o: &OptionsLatex) -> String {
    if let Some(d) = o.arrondi {
        return arrondir_rationnel(r, d);
    }
    if r.denom().is_one() {
        return r.numer().to_string();
    }
    if o.rationnels_decimaux {
        if let Some(d) = decimales_finies(r.denom()) {
            if d <= DECIMALES_MAX {
                return arrondir_rationnel(r, d);
            }
        }
    }
    let signe = if r.is_negative() { "-" } else { "" };
    format!("{signe}\\frac{{{}}}{{{}}}", r.numer().abs(), r.denom())
}

/// Résultat flottant arrondi, en LaTeX (±\infty pour les infinis).
pub fn latex_flottant(v: f64, decimales: usize) -> String {
    if v.is_infinite() {
        return if v > 0.0 { "\\infty" } else { "-\\infty" }.to_string();
    }
    arrondir(v, decimales)
}

/* ------------------------ Noms ------------------------ */

const GRECS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "phi", "chi", "psi", "omega", "Gamma",
    "Delta", "Theta", "Lambda", "Xi", "Sigma", "Phi", "Psi", "Omega",
];

/// Nom de symbole en LaTeX : `x`, `\mathrm{abc}`, `\alpha`, `x_{1}`.
pub fn latex_nom(nom: &str) -> String {
    if let Some((base, indice)) = nom.split_once('_') {
        if !base.is_empty() && !indice.is_empty() {
            return format!("{}_{{{}}}", latex_nom(base), latex_nom(indice));
        }
    }
    if GRECS.contains(&nom) {
        return format!("\\{nom}");
    }
    if nom.chars().count() == 1 {
        return nom.to_string();
    }
    format!("\\mathrm{{{nom}}}")
}

/// En-tête d’une définition : `a`, `\mathrm{aire}`, `f\left(x,y\right)`.
pub fn latex_entete(nom: &str, params: Option<&[String]>) -> String {
    match params {
        None => latex_nom(nom),
        Some(ps) => {
            let ps: Vec<String> = ps.iter().map(|p| latex_nom(p)).collect();
            format!("{}{}", latex_nom(nom), parentheses(&ps.join(",")))
        }
    }
}

/* ------------------------ Appels ------------------------ */

fn latex_fonction(nom: &str, args: &[Expr], o: &OptionsLatex) -> String {
    let a: Vec<String> = args.iter().map(|x| format_latex(x, o)).collect();
    let liste = a.join(",");

    match (nom, a.as_slice()) {
        ("abs", [x]) => format!("\\left|{x}\\right|"),
        ("floor", [x]) => format!("\\left\\lfloor{x}\\right\\rfloor"),
        ("ceil", [x]) => format!("\\left\\lceil{x}\\right\\rceil"),
        ("asin", _) => format!("\\arcsin{}", parentheses(&liste)),
        ("acos", _) => format!("\\arccos{}", parentheses(&liste)),
        ("atan", _) => format!("\\arctan{}", parentheses(&liste)),
        ("log10", _) => format!("\\log_{{10}}{}", parentheses(&liste)),
        ("ln" | "log" | "exp" | "sinh" | "cosh" | "tanh" | "min" | "max", _) => {
            format!("\\{nom}{}", parentheses(&liste))
        }
        _ => format!("{}{}", latex_nom(nom), parentheses(&liste)),
    }
}

/* ------------------------ Expr -> LaTeX ------------------------ */

pub fn format_latex(e: &Expr, o: &OptionsLatex) -> String {
    use Expr::*;

    let f = |x: &Expr| format_latex(x, o);

    // opérande : parenthèses si sa précédence est trop faible
    let operande = |x: &Expr, min: u8, negatif_interdit: bool| {
        let s = format_latex(x, o);
        if niveau(x) < min || (negatif_interdit && est_negatif(x)) {
            parentheses(&s)
        } else {
            s
        }
    };

    match e {
        Rat(r) => latex_rationnel(r, o),
        Pi => "\\pi".to_string(),
        Indefini => "\\text{indéfini}".to_string(),
        Var(nom) => latex_nom(nom),

        Sqrt(x) => format!("\\sqrt{{{}}}", f(x)),

        Pow(base, exp) => {
            let base_txt = match base.as_ref() {
                Rat(r) if !r.denom().is_one() => parentheses(&f(base)),
                Div(_, _) => parentheses(&f(base)),
                _ => operande(base, 4, true),
            };
            format!("{base_txt}^{{{}}}", f(exp))
        }

        Sin(x) => format!("\\sin{}", parentheses(&f(x))),
        Cos(x) => format!("\\cos{}", parentheses(&f(x))),
        Tan(x) => format!("\\tan{}", parentheses(&f(x))),

        Fonction(nom, args) => latex_fonction(nom, args, o),

        Add(a, b) => format!("{}+{}", f(a), operande(b, 1, true)),

        Sub(a, b) if est_zero(a) => format!("-{}", operande(b, 2, true)),
        Sub(a, b) => format!("{}-{}", f(a), operande(b, 2, true)),

        Mul(a, b) => format!("{}\\cdot {}", operande(a, 2, false), operande(b, 2, true)),

        Implicite(a, b) => {
            let ga = operande(a, 2, false);
            let dr = operande(b, 2, true);
            let commence_par_chiffre = dr.starts_with(|c: char| c.is_ascii_digit() || c == '.');
            if o.masquer_implicite && !commence_par_chiffre {
                format!("{ga} {dr}")
            } else {
                format!("{ga}\\cdot {dr}")
            }
        }

        Div(a, b) => format!("\\frac{{{}}}{{{}}}", f(a), f(b)),
    }
}
