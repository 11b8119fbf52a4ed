use clap::{Parser, Subcommand};
use ds1990a::{ControlMailbox, ControlMessage, FAMILY_CODE, KeyReader};
use onewire_core::{OneWireMaster, RomId, consts::ONEWIRE_SEARCH_CMD};
use onewire_gpio::OneWireGpio;

mod wire;
use wire::Wire;

/// Host-side playground for the DS1990A engine: a bit-banged bus master
/// reads an emulated key over a simulated open-drain wire.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Key serial number, 12 hex digits, least-significant byte first
    #[arg(short, long, default_value = "deadbeef0102")]
    serial: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the emulated key with the polling reader.
    Read,
    /// Walk the emulated key through Read ROM and a full Search ROM pass.
    Search,
}

fn parse_serial(text: &str) -> [u8; 6] {
    assert_eq!(text.len(), 12, "serial must be 12 hex digits");
    let mut serial = [0u8; 6];
    for (index, byte) in serial.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&text[index * 2..index * 2 + 2], 16)
            .expect("serial must be hex digits");
    }
    serial
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    let key = RomId::from_serial(FAMILY_CODE, parse_serial(&args.serial));
    log::info!("emulated key: {key}");
    match args.command {
        Command::Read => read_demo(&key),
        Command::Search => search_demo(&key),
    }
}

/// The reader polls the probe until the key is "touched" to it.
fn read_demo(key: &RomId) {
    let (pin, delay, wire) = Wire::shared(key);
    let mut bus = OneWireGpio::new(pin, delay);
    let mut dest = RomId::default();
    let mailbox: ControlMailbox<'_> = ControlMailbox::new();
    let mut reader = KeyReader::new();

    // Nobody has touched the probe yet.
    wire.borrow_mut().set_key_present(false);
    mailbox.signal(ControlMessage::read(&mut dest));
    for attempt in 1.. {
        if let Some(message) = mailbox.try_take() {
            reader.control(message);
        }
        match reader.poll(&mut bus).expect("the virtual wire cannot fault") {
            Some(event) => {
                log::info!("attempt {attempt}: {event:?}");
                break;
            }
            None => log::info!("attempt {attempt}: no key on the probe"),
        }
        if attempt == 3 {
            log::info!("touching the key to the probe");
            wire.borrow_mut().set_key_present(true);
        }
        // A firmware loop would sleep one poll interval here; virtual time
        // only advances while the master is waiting anyway.
    }
    drop(reader);
    log::info!(
        "captured {dest} (crc {})",
        if dest.is_valid() { "ok" } else { "BAD" }
    );
    assert_eq!(dest, *key);
}

/// Drive the emulated key by hand: Read ROM, then a Search ROM pass that
/// follows the key's own bits through all 64 triplets.
fn search_demo(key: &RomId) {
    let (pin, delay, _wire) = Wire::shared(key);
    let mut bus = OneWireGpio::new(pin, delay);

    let direct = bus.read_rom().expect("the emulated key answers Read ROM");
    log::info!("read rom: {direct}");

    assert!(bus.reset().expect("reset"), "no presence pulse");
    bus.write_byte(ONEWIRE_SEARCH_CMD).expect("search command");
    let mut bytes = [0u8; 8];
    for index in 0..64 {
        let bit = bus.read_bit().expect("bit slot");
        let complement = bus.read_bit().expect("complement slot");
        assert!(
            bit != complement,
            "a single key always answers a determinate triplet"
        );
        log::debug!("triplet {index:02}: {}{}", u8::from(bit), u8::from(complement));
        bus.write_bit(bit).expect("direction slot");
        if bit {
            bytes[index / 8] |= 1 << (index % 8);
        }
    }
    let found = RomId::new(bytes);
    log::info!("search rom: {found}");
    assert_eq!(found, *key);
}
