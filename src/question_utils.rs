//! Utilidades compartidas por los generadores: firmas, ids e iconos.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Icon;

/// Un generador que agota sus intentos no es un fallo del programa:
/// la ronda sigue, más corta o terminando antes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("se agotaron los {attempts} intentos de generación")]
    Exhausted { attempts: u32 },
    #[error("no quedan iconos disponibles para este tipo de pregunta")]
    EmptyIconPool,
    #[error("este modo no genera preguntas de una en una")]
    UnsupportedMode,
    #[error("la fuente de preguntas de IA no está configurada")]
    NoAiSource,
    #[error("la fuente de preguntas de IA falló: {0}")]
    AiSource(String),
}

pub type GenResult<T> = Result<T, GenError>;

/// Conjunto de firmas de una ronda. Es la única autoridad sobre qué
/// preguntas ya existen: cada generador reclama la firma antes de
/// devolver la pregunta.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignatureSet(HashSet<String>);

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.0.contains(signature)
    }

    /// Consulta e inserta en un solo paso. Devuelve `true` si la firma era
    /// nueva y ha quedado reclamada para esta ronda.
    pub fn claim(&mut self, signature: &str) -> bool {
        self.0.insert(signature.to_string())
    }

    /// Inserta sin comprobar, para firmas auxiliares.
    pub fn add(&mut self, signature: &str) {
        self.0.insert(signature.to_string());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Id corto para preguntas, opciones y cartas.
pub fn generate_id(rng: &mut impl Rng) -> String {
    format!("{:08x}", rng.random::<u32>())
}

/// Copia barajada, al estilo del resto de generadores que no quieren
/// tocar el original.
pub fn shuffled<T: Clone>(items: &[T], rng: &mut impl Rng) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Ordena el inventario poniendo primero los iconos que no se han visto
/// hace poco. Es una preferencia, no un filtro: los "gastados" siguen al
/// final por si hacen falta.
pub fn prioritized_icon_pool(base_unlocked: &[Icon], recently_used: &[Icon]) -> Vec<Icon> {
    let mut seen: HashSet<&str> = HashSet::new();
    let unique: Vec<&Icon> = base_unlocked
        .iter()
        .filter(|icon| !icon.trim().is_empty() && seen.insert(icon.as_str()))
        .collect();

    let recent: HashSet<&str> = recently_used.iter().map(|i| i.as_str()).collect();

    let fresh = unique.iter().filter(|i| !recent.contains(i.as_str()));
    let stale = unique.iter().filter(|i| recent.contains(i.as_str()));
    fresh.chain(stale).map(|i| (*i).clone()).collect()
}

/// Elige hasta `max_to_return` iconos del pool relajando las exclusiones
/// por fases: primero evita los usados en esta generación, luego solo los
/// usados por este modo, y al final acepta cualquiera. Con pool no vacío
/// nunca se queda sin respuesta por escasez.
pub fn candidate_icons(
    prioritized_pool: &[Icon],
    used_in_cycle: &HashSet<Icon>,
    used_in_mode_cycle: Option<&HashSet<Icon>>,
    max_to_return: usize,
    exclude: &[Icon],
    rng: &mut impl Rng,
) -> Vec<Icon> {
    let exclusion: HashSet<&str> = exclude.iter().map(|i| i.as_str()).collect();
    let blocked_by_mode = |icon: &Icon| {
        used_in_mode_cycle
            .map(|set| set.contains(icon))
            .unwrap_or(false)
    };

    let mut candidates: Vec<Icon> = prioritized_pool
        .iter()
        .filter(|icon| {
            !exclusion.contains(icon.as_str())
                && !used_in_cycle.contains(*icon)
                && !blocked_by_mode(icon)
        })
        .cloned()
        .collect();

    if candidates.len() < max_to_return && !prioritized_pool.is_empty() {
        // Relajación: admite iconos usados por otros modos en este ciclo.
        let more: Vec<Icon> = prioritized_pool
            .iter()
            .filter(|icon| {
                !exclusion.contains(icon.as_str())
                    && !candidates.contains(*icon)
                    && !blocked_by_mode(icon)
            })
            .cloned()
            .collect();
        candidates.extend(more);
    }

    if candidates.len() < max_to_return && !prioritized_pool.is_empty() {
        // Última relajación: cualquier icono no excluido explícitamente.
        let rest: Vec<Icon> = prioritized_pool
            .iter()
            .filter(|icon| !exclusion.contains(icon.as_str()) && !candidates.contains(*icon))
            .cloned()
            .collect();
        candidates.extend(rest);
    }

    let mut seen: HashSet<Icon> = HashSet::new();
    candidates.retain(|icon| seen.insert(icon.clone()));
    candidates.shuffle(rng);
    candidates.truncate(max_to_return);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn icons(list: &[&str]) -> Vec<Icon> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn claim_rechaza_firmas_repetidas() {
        let mut sigs = SignatureSet::new();
        assert!(sigs.claim("std-+-3-4-q"));
        assert!(!sigs.claim("std-+-3-4-q"));
        assert_eq!(sigs.len(), 1);
    }

    #[test]
    fn el_pool_prioriza_los_iconos_frescos() {
        let base = icons(&["🐶", "🐱", "🍎", "🍌"]);
        let recent = icons(&["🐶", "🍎"]);
        let pool = prioritized_icon_pool(&base, &recent);
        assert_eq!(pool, icons(&["🐱", "🍌", "🐶", "🍎"]));
    }

    #[test]
    fn el_pool_elimina_duplicados_y_vacios() {
        let base = icons(&["🐶", "🐶", "", "🍎"]);
        let pool = prioritized_icon_pool(&base, &[]);
        assert_eq!(pool, icons(&["🐶", "🍎"]));
    }

    #[test]
    fn candidate_icons_relaja_restricciones_antes_de_rendirse() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = icons(&["🐶", "🐱", "🍎"]);
        let mut used: HashSet<Icon> = HashSet::new();
        used.extend(pool.iter().cloned());

        // Todo está "usado" en este ciclo, pero el pool no está vacío:
        // la relajación progresiva aun así entrega iconos.
        let picked = candidate_icons(&pool, &used, None, 2, &[], &mut rng);
        assert_eq!(picked.len(), 2);

        // La exclusión explícita sí es dura.
        let picked = candidate_icons(&pool, &used, None, 3, &icons(&["🐶"]), &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(!picked.contains(&"🐶".to_string()));
    }
}
