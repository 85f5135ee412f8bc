// src/noyau/rendu.rs
//
// LaTeX (sous-ensemble produit par format.rs) -> texte Unicode pour un label egui.
//   \frac{a}{b} -> a/b        \sqrt{x} -> √x        x^{2} -> x²       x_{1} -> x₁
//   \left( … \right) -> ( … ) \cdot -> ·            \pi -> π          \infty -> ∞
// Un LaTeX mal formé est refusé (accolades, commande inconnue, argument manquant, \left/\right).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurRendu {
    #[error("accolade non fermée")]
    AccoladeNonFermee,

    #[error("accolade fermante inattendue")]
    AccoladeOrpheline,

    #[error("commande inconnue: \\{0}")]
    CommandeInconnue(String),

    #[error("argument manquant pour \\{0}")]
    ArgumentManquant(String),

    #[error("\\left et \\right non appariés")]
    DelimiteurNonApparie,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptionsRendu {
    /// Mode “bloc” : `=` et `:=` aérés.
    pub affichage: bool,
}

pub fn rendre(latex: &str, options: OptionsRendu) -> Result<String, ErreurRendu> {
    let mut l = Lecteur {
        chars: latex.chars().collect(),
        pos: 0,
        options,
        delimiteurs: 0,
    };
    let out = l.sequence(false)?;
    if l.delimiteurs != 0 {
        return Err(ErreurRendu::DelimiteurNonApparie);
    }
    Ok(out)
}

struct Lecteur {
    chars: Vec<char>,
    pos: usize,
    options: OptionsRendu,
    delimiteurs: usize, // \left ouverts
}

impl Lecteur {
    fn suivant(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn regarder(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn sauter_espaces(&mut self) {
        while matches!(self.regarder(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Lit jusqu’à la fin du texte, ou jusqu’à '}' si `dans_groupe`.
    fn sequence(&mut self, dans_groupe: bool) -> Result<String, ErreurRendu> {
        let mut out = String::new();
        loop {
            let Some(c) = self.suivant() else {
                if dans_groupe {
                    return Err(ErreurRendu::AccoladeNonFermee);
                }
                return Ok(out);
            };
            match c {
                '}' if dans_groupe => return Ok(out),
                '}' => return Err(ErreurRendu::AccoladeOrpheline),
                '{' => out.push_str(&self.sequence(true)?),
                '\\' => out.push_str(&self.commande()?),
                '^' => {
                    let a = self.argument("^")?;
                    out.push_str(&exposant(&a));
                }
                '_' => {
                    let a = self.argument("_")?;
                    out.push_str(&indice(&a));
                }
                '~' => out.push(' '),
                c if c.is_whitespace() => {}
                ':' if self.regarder() == Some('=') => {
                    self.pos += 1;
                    out.push_str(if self.options.affichage { " := " } else { ":=" });
                }
                '=' if self.options.affichage => out.push_str(" = "),
                c => out.push(c),
            }
        }
    }

    /// Argument d’une commande : {groupe}, \commande, ou un seul caractère.
    fn argument(&mut self, contexte: &str) -> Result<String, ErreurRendu> {
        self.sauter_espaces();
        match self.suivant() {
            Some('{') => self.sequence(true),
            Some('\\') => self.commande(),
            Some('}') | None => Err(ErreurRendu::ArgumentManquant(contexte.to_string())),
            Some(c) => Ok(c.to_string()),
        }
    }

    fn nom_commande(&mut self) -> String {
        let debut = self.pos;
        while matches!(self.regarder(), Some(c) if c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == debut {
            // commande d’un seul symbole : \_ \{ \, …
            return self.suivant().map(String::from).unwrap_or_default();
        }
        self.chars[debut..self.pos].iter().collect()
    }

    fn commande(&mut self) -> Result<String, ErreurRendu> {
        let nom = self.nom_commande();

        if let Some(g) = grec(&nom) {
            return Ok(g.to_string());
        }

        Ok(match nom.as_str() {
            "frac" => {
                let num = self.argument("frac")?;
                let den = self.argument("frac")?;
                format!("{}/{}", entoure(&num), entoure(&den))
            }
            "sqrt" => format!("√{}", entoure(&self.argument("sqrt")?)),
            "mathrm" | "text" | "operatorname" => self.argument(&nom)?,

            "left" => {
                self.delimiteurs += 1;
                self.delimiteur("left")?
            }
            "right" => {
                if self.delimiteurs == 0 {
                    return Err(ErreurRendu::DelimiteurNonApparie);
                }
                self.delimiteurs -= 1;
                self.delimiteur("right")?
            }

            "cdot" => "·".to_string(),
            "times" => "×".to_string(),
            "infty" => "∞".to_string(),
            "lfloor" => "⌊".to_string(),
            "rfloor" => "⌋".to_string(),
            "lceil" => "⌈".to_string(),
            "rceil" => "⌉".to_string(),

            "sin" | "cos" | "tan" | "arcsin" | "arccos" | "arctan" | "sinh" | "cosh" | "tanh"
            | "exp" | "ln" | "log" | "min" | "max" => nom,

            "_" | "{" | "}" | "|" => nom,
            "," | ";" | " " | "quad" => " ".to_string(),

            "" => return Err(ErreurRendu::ArgumentManquant("\\".to_string())),
            _ => return Err(ErreurRendu::CommandeInconnue(nom)),
        })
    }

    /// Délimiteur après \left / \right : ( ) [ ] | . ou \lfloor …
    fn delimiteur(&mut self, contexte: &str) -> Result<String, ErreurRendu> {
        self.sauter_espaces();
        match self.suivant() {
            Some('.') => Ok(String::new()),
            Some('\\') => self.commande(),
            Some(c) if "()[]|".contains(c) => Ok(c.to_string()),
            _ => Err(ErreurRendu::ArgumentManquant(contexte.to_string())),
        }
    }
}

/// Parenthèses autour d’un opérande composé (a+b)/c, √(x+1).
fn entoure(s: &str) -> String {
    let compose = s.chars().count() > 1
        && s.chars().skip(1).any(|c| "+-·×/= ".contains(c));
    let negatif = s.starts_with('-') && s.chars().count() > 1 && s != "-∞";
    if compose || (negatif && s.contains('/')) {
        format!("({s})")
    } else {
        s.to_string()
    }
}

fn grec(nom: &str) -> Option<char> {
    Some(match nom {
        "alpha" => 'α',
        "beta" => 'β',
        "gamma" => 'γ',
        "delta" => 'δ',
        "epsilon" => 'ε',
        "zeta" => 'ζ',
        "eta" => 'η',
        "theta" => 'θ',
        "iota" => 'ι',
        "kappa" => 'κ',
        "lambda" => 'λ',
        "mu" => 'μ',
        "nu" => 'ν',
        "xi" => 'ξ',
        "pi" => 'π',
        "rho" => 'ρ',
        "sigma" => 'σ',
        "tau" => 'τ',
        "phi" => 'φ',
        "chi" => 'χ',
        "psi" => 'ψ',
        "omega" => 'ω',
        "Gamma" => 'Γ',
        "Delta" => 'Δ',
        "Theta" => 'Θ',
        "Lambda" => 'Λ',
        "Xi" => 'Ξ',
        "Sigma" => 'Σ',
        "Phi" => 'Φ',
        "Psi" => 'Ψ',
        "Omega" => 'Ω',
        _ => return None,
    })
}

fn en_exposant(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        _ => return None,
    })
}

fn en_indice(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        'n' => 'ₙ',
        'i' => 'ᵢ',
        _ => return None,
    })
}

fn exposant(s: &str) -> String {
    s.chars()
        .map(en_exposant)
        .collect::<Option<String>>()
        .unwrap_or_else(|| format!("^{}", entoure_toujours(s)))
}

fn indice(s: &str) -> String {
    s.chars()
        .map(en_indice)
        .collect::<Option<String>>()
        .unwrap_or_else(|| format!("_{}", entoure_toujours(s)))
}

fn entoure_toujours(s: &str) -> String {
    if s.chars().count() == 1 {
        s.to_string()
    } else {
        format!("({s})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(s: &str) -> String {
        rendre(s, OptionsRendu::default()).unwrap_or_else(|e| panic!("rendre({s:?}): {e}"))
    }

    #[test]
    fn fractions_et_racines() {
        assert_eq!(r("\\frac{\\sqrt{2}}{2}"), "√2/2");
        assert_eq!(r("\\frac{1}{x+1}"), "1/(x+1)");
        assert_eq!(r("\\sqrt{x+1}"), "√(x+1)");
        assert_eq!(r("-\\frac{1}{3}"), "-1/3");
    }

    #[test]
    fn exposants_indices() {
        assert_eq!(r("x^{2}+1"), "x²+1");
        assert_eq!(r("2^{-1}"), "2⁻¹");
        assert_eq!(r("e^{\\pi}"), "e^π");
        assert_eq!(r("x_{1}"), "x₁");
        assert_eq!(r("\\log_{10}\\left(x\\right)"), "log₁₀(x)");
    }

    #[test]
    fn delimiteurs_et_symboles() {
        assert_eq!(r("\\left|x\\right|"), "|x|");
        assert_eq!(r("\\left\\lfloor x\\right\\rfloor"), "⌊x⌋");
        assert_eq!(r("2 x\\cdot\\pi"), "2x·π");
        assert_eq!(r("\\mathrm{aire}"), "aire");
        assert_eq!(r("-\\infty"), "-∞");
        assert_eq!(r("\\alpha+\\Omega"), "α+Ω");
    }

    #[test]
    fn mode_affichage() {
        let o = OptionsRendu { affichage: true };
        assert_eq!(
            rendre("f\\left(x\\right):=x^{2}", o).unwrap(),
            "f(x) := x²"
        );
        assert_eq!(rendre("1+1=2", o).unwrap(), "1+1 = 2");
        assert_eq!(r("a:=3"), "a:=3");
    }

    #[test]
    fn latex_mal_forme() {
        let o = OptionsRendu::default();
        assert_eq!(rendre("{x", o), Err(ErreurRendu::AccoladeNonFermee));
        assert_eq!(rendre("x}", o), Err(ErreurRendu::AccoladeOrpheline));
        assert_eq!(
            rendre("\\foo", o),
            Err(ErreurRendu::CommandeInconnue("foo".into()))
        );
        assert_eq!(
            rendre("\\frac{1}", o),
            Err(ErreurRendu::ArgumentManquant("frac".into()))
        );
        assert_eq!(rendre("\\left(x", o), Err(ErreurRendu::DelimiteurNonApparie));
        assert_eq!(rendre("x\\right)", o), Err(ErreurRendu::DelimiteurNonApparie));
        assert_eq!(rendre("x^", o), Err(ErreurRendu::ArgumentManquant("^".into())));
    }
}
