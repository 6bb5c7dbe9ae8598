// util.rs
//
// Formateo para los paneles de la CLI.

/// Formatea un área con dos decimales y sufijo " ha".
pub fn format_area(area_ha: f64) -> String {
  format!("{:.2} ha", area_ha)
}

/// Agrupa los millares de un entero con puntos (convención pt-BR):
/// `23912000` -> `"23.912.000"`.
pub fn format_grouped(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  let offset = digits.len() % 3;
  for (i, c) in digits.chars().enumerate() {
    if i != 0 && (i + 3 - offset) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out
}
