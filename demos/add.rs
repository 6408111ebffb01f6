use color_eyre::eyre::Result;

use cpu8::memory::StdMem;
use cpu8::processor::observer::LogObserver;
use cpu8::processor::Processor;
use cpu8::write_instructions;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let mut mem = StdMem::default();
    let mut cpu = Processor::new();

    use cpu8::processor::Instruction::*;
    write_instructions!(mem : 0 =>
        LDI, 0, 8,
        LDI, 1, 9,
        ADD, 0, 1,
        PRN, 0,
        HLT
    )?;

    cpu.run(&mut mem, &mut LogObserver)?;

    Ok(())
}
