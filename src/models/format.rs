// ============================================================================
// Helpers : arrondi et formatage des nombres
// ============================================================================
// Tout l'affichage numérique du convertisseur passe par ici :
// - arrondi à 5 décimales (précision commune aux deux sens de conversion)
// - taux formaté façon locale française (espace des milliers, virgule)
// - montants réinjectés dans les champs de saisie (donc re-parsables)
//
// CONCEPTS RUST :
// 1. f64 et Display : "{}" affiche la représentation la plus courte qui
//    round-trip, jamais de notation scientifique
// 2. Slices de chaîne : on retaille la partie décimale sans allouer
// ============================================================================

/// Arrondit à 5 décimales
///
/// CONCEPT : Précision fixe partagée
/// - Les deux sens de conversion (multiplication et division) utilisent le
///   même arrondi, ce qui borne l'erreur d'un aller-retour à ~1e-5 relatif
pub fn round_five_digits(value: f64) -> f64 {
    let rounded = (value * 100_000.0).round() / 100_000.0;
    // Normalise -0.0 en 0.0 pour ne jamais afficher "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Formate un taux pour la ligne de comparaison : "90 000,01124"
///
/// Convention locale française : espace pour les milliers, virgule décimale,
/// au moins 2 et au plus 6 chiffres après la virgule (zéros de fin retirés)
pub fn format_rate(rate: f64) -> String {
    let rounded = round_five_digits(rate);

    // {:.6} garantit la présence du point et borne la partie décimale à 6
    let raw = format!("{:.6}", rounded.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), ""));

    // Retire les zéros de fin mais conserve au moins 2 décimales
    let mut frac = frac_part;
    while frac.len() > 2 && frac.ends_with('0') {
        frac = &frac[..frac.len() - 1];
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}{},{}", sign, group_thousands(int_part), frac)
}

/// Formate un montant réinjecté dans un champ de saisie
///
/// Contrairement au taux, le montant doit rester parsable par parse_amount :
/// point décimal, pas de groupement, zéros de fin implicitement retirés
/// par le Display de f64 ("900" et pas "900.00000")
pub fn format_amount(value: f64) -> String {
    format!("{}", round_five_digits(value))
}

/// Coercition numérique d'un champ de saisie
///
/// CONCEPT : Coercition permissive, jamais de NaN
/// - Texte vide ou invalide : 0 (le widget ne signale pas d'erreur)
/// - La virgule est acceptée comme séparateur décimal (clavier FR)
/// - parse::<f64>() accepte "NaN"/"inf", on les filtre explicitement
pub fn parse_amount(text: &str) -> f64 {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Insère une espace entre chaque groupe de 3 chiffres (partie entière)
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_five_digits() {
        assert_eq!(round_five_digits(0.123456789), 0.12346);
        assert_eq!(round_five_digits(900.0), 900.0);
        // 0.1 + 0.2 vaut 0.30000000000000004 en binaire
        assert_eq!(round_five_digits(0.1 + 0.2), 0.3);
        // Les résidus sous 1e-5 disparaissent, sans -0
        assert_eq!(round_five_digits(-0.0000001), 0.0);
        assert!(round_five_digits(-0.0000001).is_sign_positive());
    }

    #[test]
    fn test_format_rate_two_to_six_decimals() {
        // Minimum 2 décimales, même pour un entier
        assert_eq!(format_rate(90.0), "90,00");
        assert_eq!(format_rate(1.0), "1,00");
        // Zéros de fin retirés mais plancher à 2
        assert_eq!(format_rate(0.5), "0,50");
        // Les 5 décimales significatives sont conservées
        assert_eq!(format_rate(0.123456789), "0,12346");
        assert_eq!(format_rate(0.92), "0,92");
    }

    #[test]
    fn test_format_rate_groups_thousands() {
        assert_eq!(format_rate(90000.0), "90 000,00");
        assert_eq!(format_rate(1234.56789), "1 234,56789");
        assert_eq!(format_rate(1234567.0), "1 234 567,00");
    }

    #[test]
    fn test_format_amount_stays_parseable() {
        assert_eq!(format_amount(900.0), "900");
        assert_eq!(format_amount(0.30000000000000004), "0.3");
        assert_eq!(format_amount(12.34567), "12.34567");
        // Round-trip : ce qu'on écrit dans le champ doit se relire tel quel
        let written = format_amount(123.456);
        assert_eq!(parse_amount(&written), 123.456);
    }

    #[test]
    fn test_parse_amount_coercion() {
        assert_eq!(parse_amount("12.5"), 12.5);
        // Virgule décimale acceptée
        assert_eq!(parse_amount("12,5"), 12.5);
        assert_eq!(parse_amount("  42 "), 42.0);
        // Invalide ou vide : coercé à 0, jamais NaN
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("1.2.3"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }
}
