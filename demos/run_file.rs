use color_eyre::eyre::Result;

use cpu8::memory::StdMem;
use cpu8::processor::observer::Recorder;
use cpu8::processor::Processor;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let mut mem = StdMem::from_file("demos/programs/call.ls8")?;
    mem.dump();
    let mut cpu = Processor::new();
    let mut recorder = Recorder::default();

    cpu.run(&mut mem, &mut recorder)?;

    for trace in &recorder.traces {
        println!("{}", trace);
    }
    println!("Printed: {:?}", recorder.printed);

    Ok(())
}
