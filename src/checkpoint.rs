use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::hydro::FluxModel;
use crate::simulation::{Simulation, SimulationConfig};




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]


/**
 * A snapshot of a simulation that can be written to disk as CBOR and used
 * to resume the run later. Only the interior cells are stored; ghost cells
 * are rebuilt by the next exchange.
 */
pub struct Checkpoint {
    pub config: SimulationConfig,
    pub time: f64,
    pub steps: u64,
    pub nfield: usize,
    /// `nfield` planes of `nx * ny` row-major values.
    pub data: Vec<f32>,
}




// ============================================================================
impl Checkpoint {

    pub fn capture<M: FluxModel + 'static>(sim: &Simulation<M>) -> Self {
        Self {
            config: sim.config().clone(),
            time: sim.time(),
            steps: sim.steps(),
            nfield: sim.layout().nfield(),
            data: sim.interior(),
        }
    }

    /// Build a fresh simulation from this checkpoint with the given model.
    pub fn restore<M: FluxModel + 'static>(&self, model: M) -> Result<Simulation<M>, Error> {
        self.restore_with(self.config.clone(), model)
    }

    /// Like `restore`, but with a different configuration (for example a
    /// different partition or thread count). The grid must match.
    pub fn restore_with<M: FluxModel + 'static>(&self, config: SimulationConfig, model: M) -> Result<Simulation<M>, Error> {
        if model.num_fields() != self.nfield {
            return Err(Error::FieldCountMismatch { expected: model.num_fields(), found: self.nfield });
        }
        if (config.nx, config.ny) != (self.config.nx, self.config.ny) {
            return Err(Error::Checkpoint(format!(
                "checkpoint grid is {}x{}, configuration is {}x{}",
                self.config.nx, self.config.ny, config.nx, config.ny)));
        }
        let mut sim = Simulation::new(config, model)?;
        sim.load(self.time, self.steps, &self.data)?;
        Ok(sim)
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), Error> {
        ciborium::ser::into_writer(self, writer).map_err(|e| Error::Checkpoint(e.to_string()))
    }

    pub fn read<R: Read>(reader: R) -> Result<Self, Error> {
        ciborium::de::from_reader(reader).map_err(|e| Error::Checkpoint(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let mut buffer = BufWriter::new(File::create(path)?);
        self.write(&mut buffer)?;
        Ok(buffer.flush()?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::read(BufReader::new(File::open(path)?))
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::Checkpoint;
    use crate::error::Error;
    use crate::hydro::{Advection, ShallowWater};
    use crate::scheduler::{ExecutionMode, Partition};
    use crate::simulation::{Simulation, SimulationConfig};

    fn config() -> SimulationConfig {
        SimulationConfig {
            nx: 8,
            ny: 8,
            partition: Partition::single(),
            execution: ExecutionMode::Serial,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn checkpoint_survives_cbor() {
        let mut sim = Simulation::new(config(), ShallowWater::default()).unwrap();
        sim.initialize(|(x, y), u| u[0] = 1.0 + x * y);
        sim.run(0.01).unwrap();

        let mut bytes = Vec::new();
        Checkpoint::capture(&sim).write(&mut bytes).unwrap();
        let checkpoint = Checkpoint::read(&bytes[..]).unwrap();
        let restored = checkpoint.restore(ShallowWater::default()).unwrap();

        assert_eq!(restored.time(), sim.time());
        assert_eq!(restored.steps(), sim.steps());
        assert_eq!(restored.interior(), sim.interior());
        assert!(restored.is_initialized());
    }

    #[test]
    fn restore_checks_the_field_count() {
        let mut sim = Simulation::new(config(), ShallowWater::default()).unwrap();
        sim.initialize(|_, u| u[0] = 1.0);
        let checkpoint = Checkpoint::capture(&sim);

        let result = checkpoint.restore(Advection::new(1.0, 0.0));
        assert!(matches!(result, Err(Error::FieldCountMismatch { expected: 1, found: 3 })));
    }

    #[test]
    fn garbage_is_a_checkpoint_error() {
        assert!(matches!(Checkpoint::read(&b"not cbor"[..]), Err(Error::Checkpoint(_))));
    }
}
