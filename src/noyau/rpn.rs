// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr
//
// Règles:
// - Ident(name) suivi de '(' => appel de fonction (arité comptée aux virgules)
// - Ident(name) seul         => variable (Expr::Var)
// - Moins unaire : opérateur préfixe, plus fort que * mais plus faible que ^ (-2^2 = -4)
// - Produit implicite : valeur suivie de nombre / ident / '(' ("2x", "3(1+2)", "(a)(b)")
// - ^ associatif à droite

use super::erreur::ErreurNoyau;
use super::expr::Expr;
use super::jetons::Tok;

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash | Tok::Implicite => 2,
        Tok::MoinsUnaire => 3,
        Tok::Caret => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret | Tok::MoinsUnaire)
}

fn est_operateur(t: &Tok) -> bool {
    precedence(t) > 0
}

/// Dépile vers la sortie tant que la précédence/associativité l’exige.
/// On s’arrête sur '(' et sur une fonction en attente (elle reste collée à son argument).
fn depile_operateurs(tok: &Tok, ops: &mut Vec<Tok>, out: &mut Vec<Tok>) {
    while let Some(top) = ops.last() {
        if !est_operateur(top) {
            break;
        }
        let p_top = precedence(top);
        let p_tok = precedence(tok);

        let doit_pop = if is_right_associative(tok) {
            p_top > p_tok
        } else {
            p_top >= p_tok
        };
        if !doit_pop {
            break;
        }
        if let Some(op) = ops.pop() {
            out.push(op);
        }
    }
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Exemple:
///   tokens: [Ident("f"), LPar, Num(1), Virgule, Pi, RPar]
///   rpn:    [Num(1), Pi, Appel("f", 2)]
pub fn to_rpn(tokens: &[Tok]) -> Result<Vec<Tok>, ErreurNoyau> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();

    // Une entrée par '(' ouverte : Some(arité) si la parenthèse appartient à un appel.
    let mut groupes: Vec<Option<usize>> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire et le produit implicite.
    let mut prev_was_value = false;

    let mut iter = tokens.iter().cloned().peekable();

    while let Some(tok) = iter.next() {
        match tok {
            Tok::Num(_) | Tok::Pi => {
                if prev_was_value {
                    depile_operateurs(&Tok::Implicite, &mut ops, &mut out);
                    ops.push(Tok::Implicite);
                }
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Ident(name) => {
                if prev_was_value {
                    depile_operateurs(&Tok::Implicite, &mut ops, &mut out);
                    ops.push(Tok::Implicite);
                }
                if matches!(iter.peek(), Some(Tok::LPar)) {
                    // appel : la fonction attend sur la pile, sa '(' suit immédiatement
                    iter.next();
                    ops.push(Tok::Ident(name));
                    ops.push(Tok::LPar);
                    let arite = if matches!(iter.peek(), Some(Tok::RPar)) { 0 } else { 1 };
                    groupes.push(Some(arite));
                    prev_was_value = false;
                } else {
                    out.push(Tok::Ident(name));
                    prev_was_value = true;
                }
            }

            Tok::LPar => {
                if prev_was_value {
                    depile_operateurs(&Tok::Implicite, &mut ops, &mut out);
                    ops.push(Tok::Implicite);
                }
                ops.push(Tok::LPar);
                groupes.push(None);
                prev_was_value = false;
            }

            Tok::Virgule => {
                if !prev_was_value {
                    return Err(ErreurNoyau::ExpressionInvalide);
                }
                match groupes.last_mut() {
                    Some(Some(n)) => *n += 1,
                    _ => return Err(ErreurNoyau::VirguleOrpheline),
                }
                depile_jusqu_a_parenthese(&mut ops, &mut out)?;
                // la '(' reste sur la pile pour l’argument suivant
                ops.push(Tok::LPar);
                prev_was_value = false;
            }

            Tok::RPar => {
                let groupe = groupes.pop().ok_or(ErreurNoyau::ParentheseOrpheline)?;

                // "()" hors appel, ou "f(1,)" : argument manquant
                let vide_autorise = groupe == Some(0);
                if !prev_was_value && !vide_autorise {
                    return Err(ErreurNoyau::ExpressionInvalide);
                }

                depile_jusqu_a_parenthese(&mut ops, &mut out)?;

                if let Some(arite) = groupe {
                    match ops.pop() {
                        Some(Tok::Ident(name)) => out.push(Tok::Appel(name, arite)),
                        _ => return Err(ErreurNoyau::ExpressionInvalide),
                    }
                }

                prev_was_value = true;
            }

            Tok::Plus | Tok::Minus if !prev_was_value => {
                // signe : '+' unaire ignoré, '-' unaire => opérateur préfixe
                if matches!(tok, Tok::Minus) {
                    ops.push(Tok::MoinsUnaire);
                }
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err(ErreurNoyau::ExpressionInvalide);
                }
                depile_operateurs(&tok, &mut ops, &mut out);
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::MoinsUnaire | Tok::Implicite | Tok::Appel(_, _) => {
                return Err(ErreurNoyau::ExpressionInvalide)
            }
        }
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        if matches!(op, Tok::LPar | Tok::Ident(_)) {
            return Err(ErreurNoyau::ParenthesesNonFermees);
        }
        out.push(op);
    }

    Ok(out)
}

/// Dépile jusqu’à '(' (exclue), puis retire la '('.
fn depile_jusqu_a_parenthese(ops: &mut Vec<Tok>, out: &mut Vec<Tok>) -> Result<(), ErreurNoyau> {
    while let Some(top) = ops.pop() {
        if matches!(top, Tok::LPar) {
            return Ok(());
        }
        out.push(top);
    }
    Err(ErreurNoyau::ParentheseOrpheline)
}

/// Imbrication maximale d’un arbre lu (chaque opérateur ou appel ajoute un niveau).
/// Tout le noyau parcourt l’arbre récursivement : au-delà, la pile ne suit plus.
pub const PROFONDEUR_MAX: usize = 128;

/// Construit une Expr à partir d’une RPN.
///
/// - Appel(name, n):
///     - sqrt/sin/cos/tan (1 argument) => noeuds dédiés (le noyau exact les connaît)
///     - sinon => Expr::Fonction(name, args)
/// - Ident(name) => Expr::Var(name)
///
/// La pile garde la profondeur de chaque sous-arbre : refus dès PROFONDEUR_MAX dépassée.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, ErreurNoyau> {
    let mut st: Vec<(Expr, usize)> = Vec::new();

    let niveau = |enfants: usize| -> Result<usize, ErreurNoyau> {
        let p = enfants + 1;
        if p > PROFONDEUR_MAX {
            return Err(ErreurNoyau::TropImbriquee(PROFONDEUR_MAX));
        }
        Ok(p)
    };

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Num(r) => st.push((Expr::Rat(r), 1)),
            Tok::Pi => st.push((Expr::Pi, 1)),
            Tok::Ident(name) => st.push((Expr::Var(name), 1)),

            Tok::MoinsUnaire => {
                let (x, p) = st.pop().ok_or(ErreurNoyau::ExpressionInvalide)?;
                let p = niveau(p)?;
                st.push((Expr::oppose(x), p));
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret | Tok::Implicite => {
                let (b, pb) = st.pop().ok_or(ErreurNoyau::ExpressionInvalide)?;
                let (a, pa) = st.pop().ok_or(ErreurNoyau::ExpressionInvalide)?;
                let p = niveau(pa.max(pb))?;
                let (a, b) = (Box::new(a), Box::new(b));

                let e = match tok {
                    Tok::Plus => Expr::Add(a, b),
                    Tok::Minus => Expr::Sub(a, b),
                    Tok::Star => Expr::Mul(a, b),
                    Tok::Implicite => Expr::Implicite(a, b),
                    Tok::Slash => Expr::Div(a, b),
                    _ => Expr::Pow(a, b),
                };
                st.push((e, p));
            }

            Tok::Appel(name, n) => {
                if st.len() < n {
                    return Err(ErreurNoyau::ExpressionInvalide);
                }
                let (args, profondeurs): (Vec<Expr>, Vec<usize>) =
                    st.split_off(st.len() - n).into_iter().unzip();
                let p = niveau(profondeurs.into_iter().max().unwrap_or(0))?;
                st.push((construit_appel(name, args)?, p));
            }

            Tok::LPar | Tok::RPar | Tok::Virgule => return Err(ErreurNoyau::ExpressionInvalide),
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some((e, _)), true) => Ok(e),
        _ => Err(ErreurNoyau::ExpressionInvalide),
    }
}

fn construit_appel(name: String, mut args: Vec<Expr>) -> Result<Expr, ErreurNoyau> {
    let unaire: Option<fn(Box<Expr>) -> Expr> = match name.as_str() {
        "sqrt" => Some(Expr::Sqrt),
        "sin" => Some(Expr::Sin),
        "cos" => Some(Expr::Cos),
        "tan" => Some(Expr::Tan),
        _ => None,
    };

    match unaire {
        Some(ctor) => {
            if args.len() != 1 {
                return Err(ErreurNoyau::Arite {
                    nom: name,
                    attendu: 1,
                    recu: args.len(),
                });
            }
            let x = args.pop().ok_or(ErreurNoyau::ExpressionInvalide)?;
            Ok(ctor(Box::new(x)))
        }
        None => Ok(Expr::Fonction(name, args)),
    }
}

/// Pipeline complet : texte -> jetons -> RPN -> Expr (sans simplification).
pub fn parse_expression(s: &str) -> Result<Expr, ErreurNoyau> {
    if s.trim().is_empty() {
        return Err(ErreurNoyau::EntreeVide);
    }
    let jetons = super::jetons::tokenize(s)?;
    let rpn = to_rpn(&jetons)?;
    from_rpn(&rpn)
}

/// "f(x, y)" => ("f", ["x", "y"]) ; "a" => ("a", []) ; None si ce n’est pas un en-tête valide.
/// Sert aux deux moteurs pour lire le côté gauche d’une définition.
pub fn parse_entete(s: &str) -> Option<(String, Option<Vec<String>>)> {
    let s = s.trim();
    let (nom, params) = match s.find('(') {
        Some(i) => {
            let reste = s[i + 1..].strip_suffix(')')?;
            let params: Vec<String> = if reste.trim().is_empty() {
                Vec::new()
            } else {
                reste.split(',').map(|p| p.trim().to_string()).collect()
            };
            (s[..i].trim(), Some(params))
        }
        None => (s, None),
    };

    if !est_identifiant(nom) {
        return None;
    }
    if let Some(ps) = &params {
        if !ps.iter().all(|p| est_identifiant(p)) {
            return None;
        }
    }
    Some((nom.to_string(), params))
}

/// Définition lue : `nom = corps` ou `nom(p1, p2) = corps` (`:=` accepté).
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub nom: String,
    pub parametres: Option<Vec<String>>,
    pub corps: Expr,
}

/// Ok(None) si le texte ne contient pas de '=' (simple expression).
pub fn parse_definition(s: &str) -> Result<Option<Definition>, ErreurNoyau> {
    let Some((gauche, droite)) = s.split_once('=') else {
        return Ok(None);
    };
    let gauche = gauche.trim_end();
    let gauche = gauche.strip_suffix(':').unwrap_or(gauche);

    if droite.contains('=') {
        return Err(ErreurNoyau::DefinitionInvalide(s.trim().to_string()));
    }

    let (nom, parametres) = parse_entete(gauche)
        .ok_or_else(|| ErreurNoyau::DefinitionInvalide(gauche.trim().to_string()))?;

    if let Some(ps) = &parametres {
        let doublon = ps.iter().enumerate().any(|(i, p)| ps[..i].contains(p));
        if doublon {
            return Err(ErreurNoyau::DefinitionInvalide(gauche.trim().to_string()));
        }
    }

    let corps = parse_expression(droite)?;
    Ok(Some(Definition {
        nom,
        parametres,
        corps,
    }))
}

fn est_identifiant(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    !s.eq_ignore_ascii_case("pi") && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Expr {
        parse_expression(s).unwrap_or_else(|e| panic!("parse({s:?}) erreur: {e}"))
    }

    fn n(v: i64) -> Box<Expr> {
        Box::new(Expr::entier(v))
    }

    fn x() -> Box<Expr> {
        Box::new(Expr::Var("x".into()))
    }

    #[test]
    fn precedence_usuelle() {
        assert_eq!(
            p("1+2*3"),
            Expr::Add(n(1), Box::new(Expr::Mul(n(2), n(3))))
        );
    }

    #[test]
    fn puissance_associative_a_droite() {
        assert_eq!(
            p("2^3^2"),
            Expr::Pow(n(2), Box::new(Expr::Pow(n(3), n(2))))
        );
    }

    #[test]
    fn moins_unaire_sous_la_puissance() {
        // -2^2 = -(2^2)
        assert_eq!(p("-2^2"), Expr::oppose(Expr::Pow(n(2), n(2))));
        // 2*-3 = 2*(-3)
        assert_eq!(p("2*-3"), Expr::Mul(n(2), Box::new(Expr::oppose(Expr::entier(3)))));
    }

    #[test]
    fn produit_implicite() {
        assert_eq!(p("2x"), Expr::Implicite(n(2), x()));
        assert_eq!(
            p("3(x+1)"),
            Expr::Implicite(n(3), Box::new(Expr::Add(x(), n(1))))
        );
    }

    #[test]
    fn appels_et_arite() {
        assert_eq!(
            p("f(x, 2)"),
            Expr::Fonction("f".into(), vec![Expr::Var("x".into()), Expr::entier(2)])
        );
        assert_eq!(p("g()"), Expr::Fonction("g".into(), vec![]));
        assert_eq!(p("sqrt(x)"), Expr::Sqrt(x()));
        assert!(matches!(
            parse_expression("sin(1,2)"),
            Err(ErreurNoyau::Arite { .. })
        ));
    }

    #[test]
    fn erreurs_de_structure() {
        assert_eq!(parse_expression("(1+2"), Err(ErreurNoyau::ParenthesesNonFermees));
        assert_eq!(parse_expression("1+2)"), Err(ErreurNoyau::ParentheseOrpheline));
        assert_eq!(parse_expression("1,2"), Err(ErreurNoyau::VirguleOrpheline));
        assert_eq!(parse_expression("1+"), Err(ErreurNoyau::ExpressionInvalide));
        assert_eq!(parse_expression("()"), Err(ErreurNoyau::ExpressionInvalide));
        assert_eq!(parse_expression("f(1,)"), Err(ErreurNoyau::ExpressionInvalide));
        assert_eq!(parse_expression("   "), Err(ErreurNoyau::EntreeVide));
    }

    #[test]
    fn imbrication_bornee() {
        let trop = PROFONDEUR_MAX + 1;
        let moins = format!("{}1", "-".repeat(trop));
        assert_eq!(
            parse_expression(&moins),
            Err(ErreurNoyau::TropImbriquee(PROFONDEUR_MAX))
        );
        let somme = vec!["1"; trop + 1].join("+");
        assert_eq!(
            parse_expression(&somme),
            Err(ErreurNoyau::TropImbriquee(PROFONDEUR_MAX))
        );
        let racines = format!("{}2{}", "sqrt(".repeat(trop), ")".repeat(trop));
        assert!(parse_expression(&racines).is_err());

        // les parenthèses seules n’ajoutent pas de niveau
        let parentheses = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(p(&parentheses), Expr::entier(1));
        assert!(parse_expression(&format!("{}1", "-".repeat(PROFONDEUR_MAX - 1))).is_ok());
    }

    #[test]
    fn entetes_de_definition() {
        assert_eq!(parse_entete("a"), Some(("a".into(), None)));
        assert_eq!(
            parse_entete("f(x, y)"),
            Some(("f".into(), Some(vec!["x".into(), "y".into()])))
        );
        assert_eq!(parse_entete("2a"), None);
        assert_eq!(parse_entete("f(x+1)"), None);
        assert_eq!(parse_entete("pi"), None);
    }

    #[test]
    fn definitions() {
        let d = parse_definition("f(x) := x^2").unwrap().unwrap();
        assert_eq!(d.nom, "f");
        assert_eq!(d.parametres, Some(vec!["x".to_string()]));
        assert_eq!(d.corps, Expr::Pow(x(), n(2)));

        let d = parse_definition("a=3").unwrap().unwrap();
        assert_eq!((d.nom.as_str(), d.parametres), ("a", None));

        assert_eq!(parse_definition("1+2"), Ok(None));
        assert!(parse_definition("f(x,x)=1").is_err());
        assert!(parse_definition("a=b=1").is_err());
        assert!(parse_definition("2=1").is_err());
        assert_eq!(parse_definition("a="), Err(ErreurNoyau::EntreeVide));
    }
}
