use super::*;

impl GameApp {
    // Accesores seguros
    pub fn round(&self) -> &RoundState {
        self.round.as_ref().expect("No round in progress")
    }
    pub fn round_mut(&mut self) -> &mut RoundState {
        self.round.as_mut().expect("No round in progress")
    }
    // Opcionales (útiles para guardas en UI)
    pub fn round_opt(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }
    pub fn round_mut_opt(&mut self) -> Option<&mut RoundState> {
        self.round.as_mut()
    }

    pub fn has_round(&self) -> bool {
        self.round.is_some()
    }
}
